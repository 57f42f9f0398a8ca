//! TOML configuration.
//!
//! ```toml
//! [output]
//! format = "json"
//!
//! [extract]
//! extensions = ["php", "inc"]
//! qualify_doc_types = true
//! ```
//!
//! An explicitly given file must load.  The implicit locations
//! (`./.phpdoc-extract.toml`, then the user config directory) are
//! best-effort: a broken file there is reported and skipped.

use std::path::{Path, PathBuf};

use etcetera::BaseStrategy;
use serde::Deserialize;

use crate::error::ExtractError;
use crate::extract::ExtractOptions;
use crate::render::OutputFormat;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".phpdoc-extract.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub extract: ExtractOptions,
}

impl Config {
    pub fn from_toml(contents: &str) -> Result<Self, ExtractError> {
        toml::from_str(contents).map_err(|e| ExtractError::Config(e.to_string()))
    }

    pub fn load_file(path: &Path) -> Result<Self, ExtractError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|e| match e {
            ExtractError::Config(msg) => {
                ExtractError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Load `explicit` if given, otherwise search the implicit locations
    /// starting from `cwd`.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ExtractError> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }
        Ok(Self::discover(cwd))
    }

    /// The first implicit config file that loads, or the defaults.
    pub fn discover(cwd: &Path) -> Self {
        let candidates = std::iter::once(cwd.join(LOCAL_CONFIG_FILE)).chain(user_config_path());
        candidates
            .filter(|path| path.is_file())
            .find_map(|path| match Self::load_file(&path) {
                Ok(config) => {
                    tracing::debug!(path = %path.display(), "loaded config");
                    Some(config)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring config file");
                    None
                }
            })
            .unwrap_or_default()
    }
}

/// `<config dir>/phpdoc-extract/config.toml` for the current user.
pub fn user_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("phpdoc-extract").join("config.toml"))
}
