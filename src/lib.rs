//! Extract PHPDoc signature types from PHP source.
//!
//! The pipeline runs four passes over one file:
//!
//! 1. [`parser::parse_source`] parses PHP with mago and normalizes the
//!    AST into an owned [`syntax::SyntaxTree`].
//! 2. [`parents::link_parents`] records each node's parent.
//! 3. [`resolution::resolve_names`] qualifies declarations and type
//!    references against namespaces and imports.
//! 4. [`extract::Extractor`] turns the docblock of every documented
//!    function and method into a [`types::FunctionType`].
//!
//! [`pipeline::extract_source`] and [`pipeline::extract_path`] wire the
//! passes together.

pub mod config;
pub mod docblock;
pub mod error;
pub mod extract;
pub mod parents;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod resolution;
pub mod syntax;
pub mod types;
mod util;

pub use docblock::{DocblockParser, PhpDoc, PhpDocParser, TypeExpr};
pub use error::{Diagnostic, DocblockError, ExtractError, UnresolvedName};
pub use extract::{ExtractOptions, Extraction, Extractor};
pub use pipeline::{FileReport, extract_path, extract_source};
pub use render::OutputFormat;
pub use types::{FunctionType, TypeSet, flatten};
