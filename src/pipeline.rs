//! End-to-end extraction: parse, link parents, resolve names, extract.
//!
//! The passes run strictly in that order over one tree.  Each pass only
//! reads the tree and the tables produced before it.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::docblock::PhpDocParser;
use crate::error::ExtractError;
use crate::extract::{ExtractOptions, Extraction, Extractor};
use crate::parents::link_parents;
use crate::parser::parse_source;
use crate::resolution::resolve_names;

/// The result of extracting one file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Result<Extraction, ExtractError>,
}

/// Run the whole pipeline over one unit of PHP source text.
pub fn extract_source(source: &str, options: &ExtractOptions) -> Result<Extraction, ExtractError> {
    let tree = parse_source(source)?;
    tracing::debug!(nodes = tree.len(), "parsed source");

    let parents = link_parents(&tree);
    let names = resolve_names(&tree);
    let parser = PhpDocParser;

    Ok(Extractor::new(&tree, &parents, &names, &parser, options).run())
}

/// Extract a single file, or every matching file below a directory.
///
/// Directories are walked with `.gitignore` rules applied and the files
/// are returned sorted by path.  A file that fails to parse is reported
/// in its own [`FileReport`] and does not stop the walk.
pub fn extract_path(path: &Path, options: &ExtractOptions) -> Result<Vec<FileReport>, ExtractError> {
    let metadata = std::fs::metadata(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let files = if metadata.is_dir() {
        collect_files(path, options)
    } else {
        vec![path.to_path_buf()]
    };
    tracing::info!(root = %path.display(), files = files.len(), "extracting");

    Ok(files
        .into_iter()
        .map(|file| {
            let span = tracing::info_span!("file", path = %file.display());
            let outcome = span.in_scope(|| extract_file(&file, options));
            FileReport {
                path: file,
                outcome,
            }
        })
        .collect())
}

fn extract_file(path: &Path, options: &ExtractOptions) -> Result<Extraction, ExtractError> {
    tracing::debug!(path = %path.display(), "reading file");
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // Latin-1 and other non-UTF-8 bytes are replaced, not rejected.
    let source = String::from_utf8_lossy(&bytes);
    extract_source(&source, options)
}

fn collect_files(root: &Path, options: &ExtractOptions) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .require_git(false)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && has_extension(path, &options.extensions) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    files
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(&ext)))
}
