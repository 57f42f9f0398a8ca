//! PHPDoc block parsing.
//!
//! This module turns the raw text of a `/** ... */` comment into a
//! [`PhpDoc`]: the ordered `@param` tags and the `@return` tags, each
//! carrying its declared type as a [`TypeExpr`].  Only those two tags
//! are interpreted; every other tag is ignored.
//!
//! The extraction visitor consumes docblocks through the
//! [`DocblockParser`] trait so that the tag grammar can be swapped out
//! (tests use this to inject failures).
//!
//! # Submodules
//!
//! - [`tags`]: gutter stripping and splitting a comment into raw tags.
//! - [`types`]: the type expression grammar (`A|B`, `array<int, T>`,
//!   shapes, callables, ...).

mod tags;
pub mod types;

use crate::error::DocblockError;

pub use types::{ShapeItem, TypeNode, parse_type};

/// A declared type: either a single type or a union of alternatives.
///
/// Each alternative is kept in its canonical textual form, e.g.
/// `@return array<int, Foo>|null` gives
/// `Union(["array<int, Foo>", "null"])`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Single(String),
    Union(Vec<String>),
}

impl From<&TypeNode> for TypeExpr {
    fn from(node: &TypeNode) -> Self {
        match node {
            TypeNode::Union(members) => {
                TypeExpr::Union(members.iter().map(TypeNode::to_string).collect())
            }
            other => TypeExpr::Single(other.to_string()),
        }
    }
}

/// A `@param Type $name` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamTag {
    /// The parameter variable including the `$` prefix.
    pub name: String,
    pub type_expr: TypeExpr,
}

/// A `@return Type` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnTag {
    pub type_expr: TypeExpr,
}

/// The tags of one docblock that carry signature types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhpDoc {
    /// `@param` tags in the order they appear.
    pub params: Vec<ParamTag>,
    /// `@return` tags in the order they appear (normally zero or one).
    pub returns: Vec<ReturnTag>,
}

/// Parses raw docblock text into a [`PhpDoc`].
pub trait DocblockParser {
    fn parse(&self, docblock: &str) -> Result<PhpDoc, DocblockError>;
}

/// The built-in PHPDoc parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpDocParser;

impl DocblockParser for PhpDocParser {
    fn parse(&self, docblock: &str) -> Result<PhpDoc, DocblockError> {
        let mut doc = PhpDoc::default();
        for tag in tags::split_tags(docblock)? {
            match tag.name.as_str() {
                "@param" => doc.params.push(parse_param_tag(&tag.body)?),
                "@return" => doc.returns.push(ReturnTag {
                    type_expr: parse_tag_type("@return", &tag.body)?.0,
                }),
                _ => {}
            }
        }
        Ok(doc)
    }
}

/// Parse the type at the start of a tag body and return it with the
/// remaining text.
fn parse_tag_type<'b>(tag: &str, body: &'b str) -> Result<(TypeExpr, &'b str), DocblockError> {
    let body = body.trim_start();
    // `@param $x` without a type, or an empty tag.
    if body.is_empty() || body.starts_with('$') || body.starts_with("&$") || body.starts_with("...$")
    {
        return Err(DocblockError::MissingType {
            tag: tag.to_string(),
        });
    }

    let (node, rest) = parse_type(body).map_err(|message| DocblockError::InvalidType {
        tag: tag.to_string(),
        message,
    })?;
    Ok((TypeExpr::from(&node), rest))
}

/// Parse `Type [&][...]$name [description]`.
fn parse_param_tag(body: &str) -> Result<ParamTag, DocblockError> {
    let (type_expr, rest) = parse_tag_type("@param", body)?;

    let rest = rest.trim_start();
    let rest = rest.strip_prefix('&').unwrap_or(rest);
    let rest = rest.strip_prefix("...").unwrap_or(rest);
    let Some(after_dollar) = rest.strip_prefix('$') else {
        return Err(DocblockError::MissingVariable);
    };

    let name_len = after_dollar
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(after_dollar.len());
    if name_len == 0 {
        return Err(DocblockError::MissingVariable);
    }

    Ok(ParamTag {
        name: format!("${}", &after_dollar[..name_len]),
        type_expr,
    })
}
