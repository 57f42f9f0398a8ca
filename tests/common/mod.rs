#![allow(dead_code)]

use std::fs;
use std::path::Path;

use phpdoc_extract::{ExtractOptions, Extraction, FunctionType, extract_source};

/// Run the full pipeline with default options, panicking on syntax errors.
pub fn extract(php: &str) -> Extraction {
    extract_source(php, &ExtractOptions::default()).expect("source should parse")
}

/// Run the full pipeline with `qualify_doc_types` turned on.
pub fn extract_qualified(php: &str) -> Extraction {
    let options = ExtractOptions {
        qualify_doc_types: true,
        ..ExtractOptions::default()
    };
    extract_source(php, &options).expect("source should parse")
}

/// Render every record in the line format.
pub fn lines(extraction: &Extraction) -> Vec<String> {
    extraction.functions.iter().map(FunctionType::to_string).collect()
}

/// Find the record with the given qualified name.
pub fn record<'a>(extraction: &'a Extraction, name: &str) -> &'a FunctionType {
    extraction
        .functions
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("no record named {name:?} in {:?}", lines(extraction)))
}

/// Create a temp directory populated with `files` (relative path, content).
pub fn create_workspace(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    write_files(dir.path(), files);
    dir
}

pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (rel_path, content) in files {
        let full = root.join(rel_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create dirs");
        }
        fs::write(&full, content).expect("failed to write file");
    }
}
