//! PHPDoc tag splitting.
//!
//! Turns the raw text of a `/** ... */` comment into a flat list of tags.
//! Each tag's body runs from the end of its name up to the start of the
//! next tag (or the end of the comment), with the `*` gutter removed from
//! every line.

use crate::error::DocblockError;

/// One `@name body` occurrence inside a docblock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawTag {
    /// Tag name including the `@` (e.g. `"@param"`).
    pub name: String,
    pub body: String,
}

/// Strip the `/**` opening and `*/` closing delimiters.
pub(crate) fn inner_text(docblock: &str) -> Result<&str, DocblockError> {
    docblock
        .trim()
        .strip_prefix("/**")
        .and_then(|s| s.strip_suffix("*/"))
        .ok_or(DocblockError::Unterminated)
}

/// Strip leading whitespace and the `*` gutter common in docblocks.
fn strip_gutter(line: &str) -> &str {
    let trimmed = line.trim_start();
    trimmed
        .strip_prefix('*')
        .map(str::trim_start)
        .unwrap_or(trimmed)
}

fn is_tag_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '\\' || c == ':'
}

/// Split docblock text into tags.
///
/// A tag starts at an `@` followed by a letter that begins a line or
/// follows whitespace, so single-line docblocks such as
/// `/** @param Foo $a @return Bar */` yield two tags.  Inline tags like
/// `{@inheritDoc}` are not split out.
pub(crate) fn split_tags(docblock: &str) -> Result<Vec<RawTag>, DocblockError> {
    let inner = inner_text(docblock)?;

    let mut tags: Vec<RawTag> = Vec::new();
    for (line_no, line) in inner.lines().enumerate() {
        let text = strip_gutter(line);
        if line_no > 0
            && let Some(current) = tags.last_mut()
        {
            current.body.push('\n');
        }

        let mut prev: Option<char> = None;
        let mut segment_start = 0;
        let mut chars = text.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            let at_boundary = prev.is_none_or(char::is_whitespace);
            let starts_name = chars.peek().is_some_and(|&(_, n)| n.is_ascii_alphabetic());
            if c == '@' && at_boundary && starts_name {
                if let Some(current) = tags.last_mut() {
                    current.body.push_str(&text[segment_start..i]);
                }
                let name_end = text[i + 1..]
                    .find(|ch: char| !is_tag_name_char(ch))
                    .map_or(text.len(), |off| i + 1 + off);
                tags.push(RawTag {
                    name: text[i..name_end].to_string(),
                    body: String::new(),
                });
                segment_start = name_end;
                // Skip the rest of the name so `@param@x` is not split again.
                while chars.peek().is_some_and(|&(j, _)| j < name_end) {
                    chars.next();
                }
                prev = text[..name_end].chars().last();
                continue;
            }
            prev = Some(c);
        }

        if let Some(current) = tags.last_mut() {
            current.body.push_str(&text[segment_start..]);
        }
    }

    for tag in &mut tags {
        tag.body = tag.body.trim().to_string();
    }
    Ok(tags)
}
