/// PHP parsing and AST normalisation.
///
/// This module parses PHP source text with the mago_syntax parser and
/// projects the resulting arena-bound AST into an owned [`SyntaxTree`]
/// that the resolution and extraction passes work on.
///
/// Sub-modules:
/// - [`statements`]: namespace, function, and compound statement walking
/// - [`expressions`]: closures, arrow functions, and anonymous classes
///   nested in expressions
/// - [`classes`]: class, interface, trait, enum, and anonymous class
///   members
/// - [`use_statements`]: `use` import extraction
mod classes;
mod expressions;
mod statements;
mod use_statements;

use std::panic;

use bumpalo::Bump;
use mago_span::HasSpan;
use mago_syntax::ast::*;
use mago_syntax::parser::parse_file_content;

use crate::error::ExtractError;
use crate::syntax::{Node, NodeId, NodeKind, SyntaxTree};
use crate::util::LineIndex;

/// Parse PHP source text into a [`SyntaxTree`].
///
/// Any parse error reported by mago, or a panic inside the parser, is
/// returned as [`ExtractError::SourceSyntax`]; in that case nothing of
/// the file is usable.
pub fn parse_source(content: &str) -> Result<SyntaxTree, ExtractError> {
    // The mago-syntax parser contains `unreachable!()` and `.expect()`
    // calls that can panic on malformed PHP.  Treat a panic like any
    // other syntax error.
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| parse_source_inner(content)));

    match result {
        Ok(tree) => tree,
        Err(_) => {
            tracing::error!("parser panicked while parsing source");
            Err(ExtractError::SourceSyntax {
                message: "parser panicked".to_string(),
            })
        }
    }
}

fn parse_source_inner(content: &str) -> Result<SyntaxTree, ExtractError> {
    let arena = Bump::new();
    let file_id = mago_database::file::FileId::new("input.php");
    let program = parse_file_content(&arena, file_id, content);

    if let Some(error) = program.errors.iter().next() {
        return Err(ExtractError::SourceSyntax {
            message: error.to_string(),
        });
    }

    let mut builder = TreeBuilder {
        tree: SyntaxTree::new(),
        trivias: program.trivia.as_slice(),
        content,
        lines: LineIndex::new(content),
    };
    let root = builder.tree.root();
    builder.add_statements(root, program.statements.iter());

    tracing::debug!(nodes = builder.tree.len(), "normalised syntax tree");
    Ok(builder.tree)
}

/// Accumulates normalised nodes while walking the mago AST.
///
/// Bundles the program's trivia (comments/whitespace) and the raw source
/// text so that the `/** ... */` comment preceding any declaration can be
/// looked up.
pub(crate) struct TreeBuilder<'a> {
    tree: SyntaxTree,
    trivias: &'a [Trivia<'a>],
    content: &'a str,
    lines: LineIndex,
}

impl<'a> TreeBuilder<'a> {
    fn line_of(&self, node: &impl HasSpan) -> u32 {
        self.lines.line_of(node.span().start.offset)
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind, span: &impl HasSpan) -> NodeId {
        let line = self.line_of(span);
        self.tree.push(parent, Node::new(kind, line))
    }

    fn push_declaration(&mut self, parent: NodeId, kind: NodeKind, span: &impl HasSpan) -> NodeId {
        let line = self.line_of(span);
        let docblock = self.docblock_for(span).map(str::to_string);
        self.tree
            .push(parent, Node::new(kind, line).with_docblock(docblock))
    }

    /// Find the docblock comment (`/** ... */`) immediately preceding
    /// `node`.
    ///
    /// Walks the trivia backwards from the node's start.  Whitespace and
    /// ordinary comments between the docblock and the node are allowed;
    /// any code in between means the docblock belongs to something else.
    fn docblock_for(&self, node: &impl HasSpan) -> Option<&'a str> {
        let trivia = self.trivias;
        let node_start = node.span().start.offset;
        let candidate_idx = trivia.partition_point(|t| t.span.start.offset < node_start);
        if candidate_idx == 0 {
            return None;
        }

        let content_bytes = self.content.as_bytes();
        let mut covered_from = node_start;

        for t in trivia[..candidate_idx].iter().rev() {
            let gap = content_bytes
                .get(t.span.end.offset as usize..covered_from as usize)
                .unwrap_or(&[]);
            if !gap.iter().all(u8::is_ascii_whitespace) {
                return None;
            }

            match t.kind {
                TriviaKind::DocBlockComment => return Some(t.value),
                TriviaKind::WhiteSpace
                | TriviaKind::SingleLineComment
                | TriviaKind::MultiLineComment
                | TriviaKind::HashComment => {
                    covered_from = t.span.start.offset;
                }
            }
        }

        None
    }

    /// Add a `TypeReference` child for every class-like name in `hint`.
    ///
    /// Scalar and pseudo types (`int`, `mixed`, `void`, ...) are not class
    /// references and are skipped; `self`, `static`, and `parent` are kept
    /// so the resolver can bind them to the enclosing class.
    fn add_hint_references(&mut self, parent: NodeId, hint: &Hint) {
        match hint {
            Hint::Identifier(ident) => {
                let name = ident.value().to_string();
                self.push(parent, NodeKind::TypeReference { name }, hint);
            }
            Hint::Nullable(nullable) => self.add_hint_references(parent, nullable.hint),
            Hint::Union(union) => {
                self.add_hint_references(parent, union.left);
                self.add_hint_references(parent, union.right);
            }
            Hint::Intersection(intersection) => {
                self.add_hint_references(parent, intersection.left);
                self.add_hint_references(parent, intersection.right);
            }
            Hint::Parenthesized(paren) => self.add_hint_references(parent, paren.hint),
            Hint::Static(keyword) | Hint::Self_(keyword) | Hint::Parent(keyword) => {
                let name = keyword.value.to_string();
                self.push(parent, NodeKind::TypeReference { name }, hint);
            }
            _ => {}
        }
    }

    /// Add type references for every parameter hint and the return hint
    /// of a function-like declaration.
    fn add_signature_references(
        &mut self,
        parent: NodeId,
        parameter_list: &FunctionLikeParameterList,
        return_type_hint: Option<&FunctionLikeReturnTypeHint>,
    ) {
        for param in parameter_list.parameters.iter() {
            if let Some(hint) = &param.hint {
                self.add_hint_references(parent, hint);
            }
        }
        if let Some(rth) = return_type_hint {
            self.add_hint_references(parent, &rth.hint);
        }
    }
}
