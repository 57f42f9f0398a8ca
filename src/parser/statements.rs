/// Statement walking.
///
/// Projects namespaces, standalone function declarations, and every
/// compound statement that can hold a declaration (blocks, `if`, `try`,
/// loops, `switch`, `declare`) into the syntax tree.  Compound statements
/// become `Block` nodes.  Class-like statements are handed to
/// [`super::classes`], `use` statements to [`super::use_statements`], and
/// expressions to [`super::expressions`].
use mago_syntax::ast::*;

use crate::syntax::{FunctionKind, NodeId, NodeKind};

use super::TreeBuilder;

impl<'a> TreeBuilder<'a> {
    /// Add every statement in `statements` below `parent`.
    pub(super) fn add_statements(
        &mut self,
        parent: NodeId,
        statements: impl Iterator<Item = &'a Statement<'a>>,
    ) {
        for statement in statements {
            self.add_statement(parent, statement);
        }
    }

    fn add_statement(&mut self, parent: NodeId, statement: &'a Statement<'a>) {
        match statement {
            Statement::Namespace(namespace) => {
                let name = namespace
                    .name
                    .as_ref()
                    .map(|ident| ident.value().to_string())
                    .filter(|s| !s.is_empty());
                let id = self.push(parent, NodeKind::Namespace { name }, namespace);
                self.add_statements(id, namespace.statements().iter());
            }
            Statement::Use(use_stmt) => {
                let imports = Self::extract_use_items(&use_stmt.items);
                if !imports.is_empty() {
                    self.push(parent, NodeKind::Import(imports), use_stmt);
                }
            }
            Statement::Class(_)
            | Statement::Interface(_)
            | Statement::Trait(_)
            | Statement::Enum(_) => {
                self.add_class_like(parent, statement);
            }
            Statement::Function(func) => {
                let kind = NodeKind::Function {
                    kind: FunctionKind::Free,
                    name: func.name.value.to_string(),
                };
                let id = self.push_declaration(parent, kind, func);
                self.add_signature_references(
                    id,
                    &func.parameter_list,
                    func.return_type_hint.as_ref(),
                );
                self.add_statements(id, func.body.statements.iter());
            }
            Statement::Block(block) => {
                let id = self.push(parent, NodeKind::Block, block);
                self.add_statements(id, block.statements.iter());
            }
            // Conditional declarations are common in PHP:
            //   if (! function_exists('session')) {
            //       function session(...) { ... }
            //   }
            Statement::If(if_stmt) => {
                let id = self.push(parent, NodeKind::Block, if_stmt);
                self.add_expression(id, if_stmt.condition);
                self.add_if_body(id, &if_stmt.body);
            }
            Statement::Try(try_stmt) => {
                let id = self.push(parent, NodeKind::Block, try_stmt);
                self.add_statements(id, try_stmt.block.statements.iter());
                for catch in try_stmt.catch_clauses.iter() {
                    self.add_statements(id, catch.block.statements.iter());
                }
                if let Some(finally) = &try_stmt.finally_clause {
                    self.add_statements(id, finally.block.statements.iter());
                }
            }
            Statement::Foreach(foreach) => {
                let id = self.push(parent, NodeKind::Block, foreach);
                self.add_expression(id, foreach.expression);
                match &foreach.body {
                    ForeachBody::Statement(inner) => self.add_statement(id, inner),
                    ForeachBody::ColonDelimited(body) => {
                        self.add_statements(id, body.statements.iter());
                    }
                }
            }
            Statement::While(while_stmt) => {
                let id = self.push(parent, NodeKind::Block, while_stmt);
                self.add_expression(id, while_stmt.condition);
                match &while_stmt.body {
                    WhileBody::Statement(inner) => self.add_statement(id, inner),
                    WhileBody::ColonDelimited(body) => {
                        self.add_statements(id, body.statements.iter());
                    }
                }
            }
            Statement::DoWhile(do_while) => {
                let id = self.push(parent, NodeKind::Block, do_while);
                self.add_statement(id, do_while.statement);
                self.add_expression(id, do_while.condition);
            }
            Statement::For(for_stmt) => {
                let id = self.push(parent, NodeKind::Block, for_stmt);
                let headers = for_stmt
                    .initializations
                    .iter()
                    .chain(for_stmt.conditions.iter())
                    .chain(for_stmt.increments.iter());
                for expression in headers {
                    self.add_expression(id, expression);
                }
                match &for_stmt.body {
                    ForBody::Statement(inner) => self.add_statement(id, inner),
                    ForBody::ColonDelimited(body) => {
                        self.add_statements(id, body.statements.iter());
                    }
                }
            }
            Statement::Switch(switch) => {
                let id = self.push(parent, NodeKind::Block, switch);
                self.add_expression(id, switch.expression);
                for case in switch.body.cases() {
                    if let Some(expression) = case.expression() {
                        self.add_expression(id, expression);
                    }
                    self.add_statements(id, case.statements().iter());
                }
            }
            Statement::Declare(declare) => {
                let id = self.push(parent, NodeKind::Block, declare);
                match &declare.body {
                    DeclareBody::Statement(inner) => self.add_statement(id, inner),
                    DeclareBody::ColonDelimited(body) => {
                        self.add_statements(id, body.statements.iter());
                    }
                }
            }
            Statement::Expression(expression_stmt) => {
                self.add_expression(parent, expression_stmt.expression);
            }
            Statement::Return(return_stmt) => {
                if let Some(value) = return_stmt.value {
                    self.add_expression(parent, value);
                }
            }
            Statement::Echo(echo) => {
                for value in echo.values.iter() {
                    self.add_expression(parent, value);
                }
            }
            // Tags, inline HTML, jumps, constants, `global`, `static`,
            // and `unset` are not walked.
            _ => {}
        }
    }

    /// Recurse into an `if` statement body.  Handles both brace-delimited
    /// and colon-delimited bodies, including `elseif` and `else` branches.
    fn add_if_body(&mut self, parent: NodeId, body: &'a IfBody<'a>) {
        match body {
            IfBody::Statement(body) => {
                self.add_statement(parent, body.statement);
                for else_if in body.else_if_clauses.iter() {
                    self.add_statement(parent, else_if.statement);
                }
                if let Some(else_clause) = &body.else_clause {
                    self.add_statement(parent, else_clause.statement);
                }
            }
            IfBody::ColonDelimited(body) => {
                self.add_statements(parent, body.statements.iter());
                for else_if in body.else_if_clauses.iter() {
                    self.add_statements(parent, else_if.statements.iter());
                }
                if let Some(else_clause) = &body.else_clause {
                    self.add_statements(parent, else_clause.statements.iter());
                }
            }
        }
    }
}
