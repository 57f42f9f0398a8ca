//! PHPDoc type expression parsing.
//!
//! Parses the type that follows a `@param` or `@return` tag into a small
//! [`TypeNode`] tree, and renders it back in a canonical textual form.
//! Supported syntax:
//!
//! - identifiers: `Foo`, `\Foo\Bar`, `class-string`, `$this`, `Foo::BAR`
//! - literals: `42`, `-1.5`, `'foo'`, `"bar"`
//! - nullable `?T`, arrays `T[]`, parentheses `(A|B)[]`
//! - generics `array<int, User>`
//! - shapes `array{id: int, name?: string}`, `object{foo: Bar}`
//! - callables `callable(int, string): void`, `Closure(): Foo`
//! - conditionals `($x is Foo ? A : B)`
//! - unions `A|B` and intersections `A&B`
//!
//! At the top level of a tag, whitespace is allowed around `|` and `&`
//! (`ClassA | ClassB`); anything else after the type is description text.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    Identifier(String),
    Literal(String),
    Nullable(Box<TypeNode>),
    /// `T[]`
    Array(Box<TypeNode>),
    Generic {
        base: String,
        args: Vec<TypeNode>,
    },
    Shape {
        base: String,
        items: Vec<ShapeItem>,
    },
    Callable {
        base: String,
        params: Vec<TypeNode>,
        ret: Option<Box<TypeNode>>,
    },
    Conditional {
        subject: String,
        negated: bool,
        target: Box<TypeNode>,
        then: Box<TypeNode>,
        otherwise: Box<TypeNode>,
    },
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeItem {
    pub key: Option<String>,
    pub optional: bool,
    pub value: TypeNode,
}

impl TypeNode {
    fn needs_parens(&self) -> bool {
        matches!(
            self,
            TypeNode::Union(_) | TypeNode::Intersection(_) | TypeNode::Nullable(_)
        )
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, nodes: &[TypeNode], sep: &str) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", node)?;
    }
    Ok(())
}

/// Write a union/intersection member, parenthesised if it is itself a
/// compound type.
fn write_member(f: &mut fmt::Formatter<'_>, node: &TypeNode) -> fmt::Result {
    if matches!(node, TypeNode::Union(_) | TypeNode::Intersection(_)) {
        write!(f, "({})", node)
    } else {
        write!(f, "{}", node)
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Identifier(name) | TypeNode::Literal(name) => f.write_str(name),
            TypeNode::Nullable(inner) => write!(f, "?{}", inner),
            TypeNode::Array(inner) => {
                if inner.needs_parens() {
                    write!(f, "({})[]", inner)
                } else {
                    write!(f, "{}[]", inner)
                }
            }
            TypeNode::Generic { base, args } => {
                write!(f, "{}<", base)?;
                write_joined(f, args, ", ")?;
                f.write_str(">")
            }
            TypeNode::Shape { base, items } => {
                write!(f, "{}{{", base)?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if let Some(key) = &item.key {
                        let optional = if item.optional { "?" } else { "" };
                        write!(f, "{}{}: ", key, optional)?;
                    }
                    write!(f, "{}", item.value)?;
                }
                f.write_str("}")
            }
            TypeNode::Callable { base, params, ret } => {
                write!(f, "{}(", base)?;
                write_joined(f, params, ", ")?;
                f.write_str(")")?;
                if let Some(ret) = ret {
                    write!(f, ": {}", ret)?;
                }
                Ok(())
            }
            TypeNode::Conditional {
                subject,
                negated,
                target,
                then,
                otherwise,
            } => {
                let is = if *negated { "is not" } else { "is" };
                write!(
                    f,
                    "({} {} {} ? {} : {})",
                    subject, is, target, then, otherwise
                )
            }
            TypeNode::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write_member(f, member)?;
                }
                Ok(())
            }
            TypeNode::Intersection(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("&")?;
                    }
                    write_member(f, member)?;
                }
                Ok(())
            }
        }
    }
}

/// Parse the type at the start of `src`.
///
/// Returns the parsed type and the unparsed remainder (the parameter
/// variable and/or description), or a message describing why the type is
/// malformed.
pub fn parse_type(src: &str) -> Result<(TypeNode, &str), String> {
    let mut parser = TypeParser {
        src,
        pos: 0,
        depth: 0,
    };
    let node = parser.parse_union()?;

    let rest = &src[parser.pos..];
    match rest.chars().next() {
        None => Ok((node, rest)),
        Some(c) if c.is_whitespace() => Ok((node, rest)),
        Some(c) => Err(format!("unexpected character `{}` after type", c)),
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '\\' || c == '$' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\\' || c == '-' || !c.is_ascii()
}

fn is_callable_base(name: &str) -> bool {
    let name = name.trim_start_matches('\\').to_ascii_lowercase();
    matches!(
        name.as_str(),
        "callable" | "closure" | "pure-callable" | "pure-closure"
    )
}

struct TypeParser<'s> {
    src: &'s str,
    pos: usize,
    /// Bracket nesting; whitespace is only insignificant inside brackets.
    depth: u32,
}

impl<'s> TypeParser<'s> {
    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Skip whitespace that may separate type tokens at the current
    /// nesting level.  At the top level only spaces and tabs count, so a
    /// type never continues onto the next line.
    fn skip_separator_ws(&mut self) {
        if self.depth > 0 {
            self.skip_ws();
            return;
        }
        while let Some(c @ (' ' | '\t')) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        self.skip_ws();
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(format!("expected `{}`, found `{}`", expected, c)),
            None => Err(format!("expected `{}`, found end of type", expected)),
        }
    }

    fn parse_union(&mut self) -> Result<TypeNode, String> {
        let first = self.parse_intersection()?;
        let mut members = vec![first];

        loop {
            let save = self.pos;
            self.skip_separator_ws();
            if !self.eat('|') {
                self.pos = save;
                break;
            }
            self.skip_separator_ws();
            if self.peek().is_none() {
                return Err("expected type after `|`".to_string());
            }
            members.push(self.parse_intersection()?);
        }

        if members.len() == 1 {
            return Ok(members.remove(0));
        }
        // `A|(B|C)` is the same union as `A|B|C`.
        let mut flat = Vec::with_capacity(members.len());
        for member in members {
            match member {
                TypeNode::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Ok(TypeNode::Union(flat))
    }

    fn parse_intersection(&mut self) -> Result<TypeNode, String> {
        let first = self.parse_postfix()?;
        let mut members = vec![first];

        loop {
            let save = self.pos;
            self.skip_separator_ws();
            if !self.eat('&') {
                self.pos = save;
                break;
            }
            self.skip_separator_ws();
            // `Foo &$bar` and `Foo &...$bar` are by-reference parameters,
            // not intersections.
            match self.peek() {
                Some('$') | Some('.') | None => {
                    self.pos = save;
                    break;
                }
                _ => {}
            }
            members.push(self.parse_postfix()?);
        }

        if members.len() == 1 {
            Ok(members.remove(0))
        } else {
            Ok(TypeNode::Intersection(members))
        }
    }

    fn parse_postfix(&mut self) -> Result<TypeNode, String> {
        let mut node = self.parse_atom()?;
        while self.rest().starts_with("[]") {
            self.pos += 2;
            node = TypeNode::Array(Box::new(node));
        }
        Ok(node)
    }

    fn parse_atom(&mut self) -> Result<TypeNode, String> {
        if self.depth > 0 {
            self.skip_ws();
        }
        let Some(c) = self.peek() else {
            return Err("unexpected end of type".to_string());
        };

        match c {
            '?' => {
                self.bump();
                let inner = self.parse_postfix()?;
                Ok(TypeNode::Nullable(Box::new(inner)))
            }
            '(' => {
                self.bump();
                self.depth += 1;
                let inner = self.parse_parenthesized()?;
                self.depth -= 1;
                Ok(inner)
            }
            '\'' | '"' => self.parse_string_literal(c),
            c if c.is_ascii_digit()
                || (c == '-' && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit())) =>
            {
                Ok(self.parse_number_literal())
            }
            c if is_ident_start(c) => self.parse_named(),
            c => Err(format!("unexpected character `{}`", c)),
        }
    }

    /// Contents of `( ... )`: a grouped type or a conditional type.
    fn parse_parenthesized(&mut self) -> Result<TypeNode, String> {
        self.skip_ws();
        let first = self.parse_union()?;
        self.skip_ws();

        let save = self.pos;
        let word = self.read_identifier();
        if word != "is" {
            self.pos = save;
            self.expect(')')?;
            return Ok(first);
        }

        let subject = first.to_string();
        self.skip_ws();
        let save = self.pos;
        let negated = self.read_identifier() == "not";
        if !negated {
            self.pos = save;
        }
        let target = self.parse_union()?;
        self.expect('?')?;
        let then = self.parse_union()?;
        self.expect(':')?;
        let otherwise = self.parse_union()?;
        self.expect(')')?;

        Ok(TypeNode::Conditional {
            subject,
            negated,
            target: Box::new(target),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn read_identifier(&mut self) -> &'s str {
        let start = self.pos;
        if let Some(c) = self.peek()
            && is_ident_start(c)
        {
            self.bump();
            while let Some(c) = self.peek() {
                if !is_ident_char(c) {
                    break;
                }
                self.bump();
            }
        }
        &self.src[start..self.pos]
    }

    fn parse_string_literal(&mut self, quote: char) -> Result<TypeNode, String> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some(c) if c == quote => break,
                Some(_) => {}
                None => return Err("unterminated string literal".to_string()),
            }
        }
        Ok(TypeNode::Literal(self.src[start..self.pos].to_string()))
    }

    fn parse_number_literal(&mut self) -> TypeNode {
        let start = self.pos;
        self.eat('-');
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '.' || c == '_') {
                break;
            }
            self.bump();
        }
        TypeNode::Literal(self.src[start..self.pos].to_string())
    }

    /// An identifier, optionally followed by `::CONST`, generic
    /// arguments, a shape body, or a callable signature.
    fn parse_named(&mut self) -> Result<TypeNode, String> {
        let name = self.read_identifier().to_string();
        if name.ends_with('\\') {
            return Err(format!("incomplete name `{}`", name));
        }

        if self.eat_str("::") {
            let start = self.pos;
            while let Some(c) = self.peek() {
                if !(c.is_ascii_alphanumeric() || c == '_' || c == '*') {
                    break;
                }
                self.bump();
            }
            if start == self.pos {
                return Err(format!("expected constant name after `{}::`", name));
            }
            let constant = &self.src[start..self.pos];
            return Ok(TypeNode::Literal(format!("{}::{}", name, constant)));
        }

        match self.peek() {
            Some('<') => {
                self.bump();
                self.depth += 1;
                let args = self.parse_list('>', Self::parse_generic_arg)?;
                self.depth -= 1;
                if args.is_empty() {
                    return Err(format!("`{}<>` has no type arguments", name));
                }
                Ok(TypeNode::Generic { base: name, args })
            }
            Some('{') => {
                self.bump();
                self.depth += 1;
                let items = self.parse_list('}', Self::parse_shape_item)?;
                self.depth -= 1;
                Ok(TypeNode::Shape {
                    base: name,
                    items: items.into_iter().flatten().collect(),
                })
            }
            Some('(') if is_callable_base(&name) => {
                self.bump();
                self.depth += 1;
                let params = self.parse_list(')', Self::parse_callable_param)?;
                self.depth -= 1;

                let save = self.pos;
                self.skip_separator_ws();
                let ret = if self.eat(':') {
                    self.skip_separator_ws();
                    Some(Box::new(self.parse_postfix()?))
                } else {
                    self.pos = save;
                    None
                };
                Ok(TypeNode::Callable {
                    base: name,
                    params,
                    ret,
                })
            }
            _ => Ok(TypeNode::Identifier(name)),
        }
    }

    /// Parse a `,`-separated list up to `close`.  A trailing comma is
    /// allowed.
    fn parse_list<T>(
        &mut self,
        close: char,
        mut item: impl FnMut(&mut Self) -> Result<T, String>,
    ) -> Result<Vec<T>, String> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok(items);
            }
            items.push(item(self)?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            self.expect(close)?;
            return Ok(items);
        }
    }

    fn parse_generic_arg(&mut self) -> Result<TypeNode, String> {
        self.skip_ws();
        if self.eat('*') {
            return Ok(TypeNode::Identifier("*".to_string()));
        }
        // Variance annotations are not part of the type itself.
        let save = self.pos;
        let word = self.read_identifier();
        if matches!(word, "covariant" | "contravariant")
            && self.peek().is_some_and(char::is_whitespace)
        {
            self.skip_ws();
        } else {
            self.pos = save;
        }
        self.parse_union()
    }

    /// One shape entry.  Returns `None` for the `...` unsealed marker.
    fn parse_shape_item(&mut self) -> Result<Option<ShapeItem>, String> {
        self.skip_ws();
        if self.eat_str("...") {
            return Ok(None);
        }

        // Try `key:` / `key?:` first; fall back to a bare value type.
        let save = self.pos;
        let key = match self.peek() {
            Some(q @ ('\'' | '"')) => self.parse_string_literal(q).ok().map(|n| n.to_string()),
            Some(c) if c.is_ascii_digit() => Some(self.parse_number_literal().to_string()),
            Some(c) if is_ident_start(c) => Some(self.read_identifier().to_string()),
            _ => None,
        };
        if let Some(key) = key {
            self.skip_ws();
            let optional = self.eat('?');
            self.skip_ws();
            if self.eat(':') {
                let value = self.parse_union()?;
                return Ok(Some(ShapeItem {
                    key: Some(key),
                    optional,
                    value,
                }));
            }
        }
        self.pos = save;

        let value = self.parse_union()?;
        Ok(Some(ShapeItem {
            key: None,
            optional: false,
            value,
        }))
    }

    /// A callable parameter: a type optionally followed by `&`, `...`,
    /// a `$name`, and `=` (optional marker).  Only the type is kept.
    fn parse_callable_param(&mut self) -> Result<TypeNode, String> {
        let ty = self.parse_union()?;
        self.skip_ws();
        self.eat('&');
        self.eat_str("...");
        if self.peek() == Some('$') {
            self.read_identifier();
        }
        self.skip_ws();
        self.eat('=');
        Ok(ty)
    }
}
