/// Class, interface, trait, enum, and anonymous class projection.
///
/// Each class-like declaration becomes a `ClassLike` node tagged with its
/// [`ClassLikeKind`].  Its `extends` / `implements` names become
/// `TypeReference` children and each method becomes a `Function` child
/// whose kind records whether it is called statically.
use mago_syntax::ast::*;

use crate::syntax::{ANONYMOUS_CLASS_NAME, ClassLikeKind, FunctionKind, NodeId, NodeKind};

use super::TreeBuilder;

impl<'a> TreeBuilder<'a> {
    /// Add a class-like statement.  Other statement kinds are ignored.
    pub(super) fn add_class_like(&mut self, parent: NodeId, statement: &'a Statement<'a>) {
        match statement {
            Statement::Class(class) => {
                let parent_class = class
                    .extends
                    .as_ref()
                    .and_then(|ext| ext.types.first().map(|ident| ident.value().to_string()));
                let kind = NodeKind::ClassLike {
                    kind: ClassLikeKind::Class,
                    name: class.name.value.to_string(),
                    extends: parent_class,
                };
                let id = self.push(parent, kind, class);

                if let Some(ext) = &class.extends {
                    self.add_type_references(id, ext.types.iter());
                }
                if let Some(imp) = &class.implements {
                    self.add_type_references(id, imp.types.iter());
                }
                self.add_class_like_members(id, class.members.iter());
            }
            Statement::Interface(iface) => {
                let kind = NodeKind::ClassLike {
                    kind: ClassLikeKind::Interface,
                    name: iface.name.value.to_string(),
                    extends: None,
                };
                let id = self.push(parent, kind, iface);

                if let Some(ext) = &iface.extends {
                    self.add_type_references(id, ext.types.iter());
                }
                self.add_class_like_members(id, iface.members.iter());
            }
            Statement::Trait(trait_def) => {
                let kind = NodeKind::ClassLike {
                    kind: ClassLikeKind::Trait,
                    name: trait_def.name.value.to_string(),
                    extends: None,
                };
                let id = self.push(parent, kind, trait_def);
                self.add_class_like_members(id, trait_def.members.iter());
            }
            Statement::Enum(enum_def) => {
                let kind = NodeKind::ClassLike {
                    kind: ClassLikeKind::Enum,
                    name: enum_def.name.value.to_string(),
                    extends: None,
                };
                let id = self.push(parent, kind, enum_def);

                if let Some(imp) = &enum_def.implements {
                    self.add_type_references(id, imp.types.iter());
                }
                self.add_class_like_members(id, enum_def.members.iter());
            }
            _ => {}
        }
    }

    /// Add a `new class (...) extends A implements B { ... }` expression.
    pub(super) fn add_anonymous_class(&mut self, parent: NodeId, class: &'a AnonymousClass<'a>) {
        if let Some(args) = &class.argument_list {
            self.add_arguments(parent, args);
        }

        let parent_class = class
            .extends
            .as_ref()
            .and_then(|ext| ext.types.first().map(|ident| ident.value().to_string()));
        let kind = NodeKind::ClassLike {
            kind: ClassLikeKind::Anonymous,
            name: ANONYMOUS_CLASS_NAME.to_string(),
            extends: parent_class,
        };
        let id = self.push(parent, kind, class);

        if let Some(ext) = &class.extends {
            self.add_type_references(id, ext.types.iter());
        }
        if let Some(imp) = &class.implements {
            self.add_type_references(id, imp.types.iter());
        }
        self.add_class_like_members(id, class.members.iter());
    }

    fn add_type_references<'b>(
        &mut self,
        parent: NodeId,
        identifiers: impl Iterator<Item = &'b Identifier<'b>>,
    ) {
        for ident in identifiers {
            let name = ident.value().to_string();
            self.push(parent, NodeKind::TypeReference { name }, ident);
        }
    }

    /// Add every method of a class-like body.  Properties, constants,
    /// enum cases, and trait uses carry no function signature and are
    /// skipped.
    fn add_class_like_members(
        &mut self,
        parent: NodeId,
        members: impl Iterator<Item = &'a ClassLikeMember<'a>>,
    ) {
        for member in members {
            let ClassLikeMember::Method(method) = member else {
                continue;
            };

            let is_static = method.modifiers.iter().any(|m| m.is_static());
            let kind = NodeKind::Function {
                kind: if is_static {
                    FunctionKind::Static
                } else {
                    FunctionKind::Instance
                },
                name: method.name.value.to_string(),
            };
            let id = self.push_declaration(parent, kind, method);
            self.add_signature_references(
                id,
                &method.parameter_list,
                method.return_type_hint.as_ref(),
            );

            // Functions declared inside a method body are free functions.
            if let MethodBody::Concrete(block) = &method.body {
                self.add_statements(id, block.statements.iter());
            }
        }
    }
}
