//! Error and diagnostic types.
//!
//! Failures fall into three tiers:
//!
//! - [`ExtractError`] aborts a whole run (unparsable source, unreadable
//!   input, broken configuration).
//! - [`DocblockError`] is local to one declaration.  The extraction
//!   visitor records it as a [`Diagnostic`] and keeps walking.
//! - [`UnresolvedName`] is a warning from the name resolver.  The
//!   original text of the name is kept.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Fatal error for one extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The PHP parser rejected the input.  No records are produced.
    #[error("syntax error: {message}")]
    SourceSyntax { message: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// A docblock that could not be turned into a `FunctionType`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum DocblockError {
    /// The comment is not delimited by `/**` and `*/`.
    #[error("docblock is not terminated by `*/`")]
    Unterminated,

    #[error("`{tag}` tag has no type")]
    MissingType { tag: String },

    /// `@param Type` without a `$variable`.
    #[error("`@param` tag has no parameter variable")]
    MissingVariable,

    #[error("invalid type in `{tag}` tag: {message}")]
    InvalidType { tag: String, message: String },

    #[error("{count} `@return` tags found, expected at most one")]
    MultipleReturnTags { count: usize },
}

/// A declaration whose docblock failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Qualified name the record would have had.
    pub declaration: String,
    /// 1-based line of the declaration.
    pub line: u32,
    pub error: DocblockError,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.declaration, self.error)
    }
}

/// A name the resolver could not qualify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedName {
    pub name: String,
    pub line: u32,
}

impl std::fmt::Display for UnresolvedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: unresolved name `{}`", self.line, self.name)
    }
}
