/// Name-resolution pass.
///
/// Walks a [`SyntaxTree`] pre-order and computes the fully-qualified name
/// of every declaration and type reference, following PHP's rules:
///
///   1. Fully-qualified (`\Foo\Bar`) → strip the leading `\`
///   2. Relative (`namespace\Foo`) → prepend the current namespace
///   3. Qualified (`Foo\Bar`) → if the first segment is imported, expand
///      it; otherwise prepend the current namespace
///   4. Unqualified (`Bar`) → check the imports; otherwise prepend the
///      current namespace
///   5. `self` / `static` / `parent` → the enclosing class-like (or its
///      parent class)
///
/// Names that cannot be resolved keep their original text and are
/// reported as [`UnresolvedName`] warnings.
///
/// The lexical [`Scope`] of each function-like declaration is kept in the
/// resulting [`NameTable`] so that type names written in its docblock can
/// be qualified with the same rules later.
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::UnresolvedName;
use crate::syntax::{ClassLikeKind, FunctionKind, NodeId, NodeKind, SyntaxTree};

/// Type keywords that never name a class.
const BUILTIN_TYPES: &[&str] = &[
    "int",
    "integer",
    "float",
    "double",
    "string",
    "bool",
    "boolean",
    "void",
    "never",
    "null",
    "false",
    "true",
    "array",
    "callable",
    "iterable",
    "resource",
    "mixed",
    "object",
    "scalar",
    "numeric",
    "list",
    "non-empty-list",
    "non-empty-array",
    "array-key",
    "class-string",
    "positive-int",
    "negative-int",
    "non-empty-string",
    "numeric-string",
    "callable-string",
    "key-of",
    "value-of",
    "$this",
];

pub(crate) fn is_builtin_type(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    BUILTIN_TYPES.contains(&lower.as_str())
}

/// The enclosing class-like of a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassContext {
    pub fqn: String,
    /// Resolved `extends` target, if the class has one.
    pub parent: Option<String>,
}

/// Outcome of resolving one class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    /// A built-in type keyword, kept as written.
    Builtin(String),
    /// Could not be qualified; carries the original text.
    Unresolved(String),
}

impl Resolution {
    pub fn into_name(self) -> String {
        match self {
            Resolution::Resolved(s) | Resolution::Builtin(s) | Resolution::Unresolved(s) => s,
        }
    }
}

/// Lexical context for name resolution at some point of the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    namespace: Option<String>,
    /// Lowercased alias → fully-qualified name.
    imports: HashMap<String, String>,
    class: Option<ClassContext>,
}

impl Scope {
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn class(&self) -> Option<&ClassContext> {
        self.class.as_ref()
    }

    /// Qualify a declared name with the current namespace.
    pub fn qualify_declaration(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{}\\{}", ns, name),
            None => name.to_string(),
        }
    }

    /// Resolve a class name as written in source to its fully-qualified
    /// form.
    pub fn resolve_class_name(&self, name: &str) -> Resolution {
        if name.is_empty() {
            return Resolution::Unresolved(String::new());
        }

        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "self" | "static" => {
                return match &self.class {
                    Some(class) => Resolution::Resolved(class.fqn.clone()),
                    None => Resolution::Unresolved(name.to_string()),
                };
            }
            "parent" => {
                return match self.class.as_ref().and_then(|c| c.parent.clone()) {
                    Some(parent) => Resolution::Resolved(parent),
                    None => Resolution::Unresolved(name.to_string()),
                };
            }
            _ => {}
        }
        if is_builtin_type(name) {
            return Resolution::Builtin(name.to_string());
        }

        if let Some(stripped) = name.strip_prefix('\\') {
            return Resolution::Resolved(stripped.to_string());
        }

        if lower.starts_with("namespace\\") {
            let rest = &name["namespace\\".len()..];
            return Resolution::Resolved(self.qualify_declaration(rest));
        }

        if let Some(pos) = name.find('\\') {
            let first = &name[..pos];
            let rest = &name[pos..];
            if let Some(fqn) = self.imports.get(&first.to_ascii_lowercase()) {
                return Resolution::Resolved(format!("{}{}", fqn, rest));
            }
        } else if let Some(fqn) = self.imports.get(&lower) {
            return Resolution::Resolved(fqn.clone());
        }

        Resolution::Resolved(self.qualify_declaration(name))
    }
}

/// Fully-qualified names computed by [`resolve_names`].
#[derive(Debug, Clone)]
pub struct NameTable {
    names: Vec<Option<String>>,
    scopes: Vec<Option<Rc<Scope>>>,
    warnings: Vec<UnresolvedName>,
}

impl NameTable {
    /// The resolved name of a declaration or type reference.
    ///
    /// Methods resolve to their bare name; they are qualified by the
    /// extraction visitor through their enclosing class-like.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.names.get(id.index()).and_then(|n| n.as_deref())
    }

    /// The lexical scope of a function-like declaration.
    pub fn scope(&self, id: NodeId) -> Option<&Scope> {
        self.scopes.get(id.index()).and_then(|s| s.as_deref())
    }

    pub fn warnings(&self) -> &[UnresolvedName] {
        &self.warnings
    }
}

struct Resolver<'t> {
    tree: &'t SyntaxTree,
    scope: Rc<Scope>,
    table: NameTable,
}

/// Run name resolution over `tree`.
pub fn resolve_names(tree: &SyntaxTree) -> NameTable {
    let mut resolver = Resolver {
        tree,
        scope: Rc::new(Scope::default()),
        table: NameTable {
            names: vec![None; tree.len()],
            scopes: vec![None; tree.len()],
            warnings: Vec::new(),
        },
    };
    resolver.visit(tree.root());

    tracing::debug!(
        warnings = resolver.table.warnings.len(),
        "resolved names"
    );
    resolver.table
}

impl Resolver<'_> {
    fn visit(&mut self, id: NodeId) {
        let tree = self.tree;
        let node = tree.node(id);
        match &node.kind {
            NodeKind::Namespace { name } => {
                self.table.names[id.index()] = name.clone();
                // Namespaces do not nest; imports do not carry over.
                let entered = Rc::new(Scope {
                    namespace: name.clone(),
                    ..Scope::default()
                });
                self.with_scope(entered, id);
            }
            NodeKind::Import(imports) => {
                let scope = Rc::make_mut(&mut self.scope);
                for import in imports {
                    scope
                        .imports
                        .insert(import.alias.to_ascii_lowercase(), import.fqn.clone());
                }
            }
            NodeKind::ClassLike {
                kind,
                name,
                extends,
            } => {
                let fqn = if *kind == ClassLikeKind::Anonymous {
                    name.clone()
                } else {
                    self.scope.qualify_declaration(name)
                };
                let parent = extends
                    .as_deref()
                    .map(|e| self.scope.resolve_class_name(e).into_name());
                self.table.names[id.index()] = Some(fqn.clone());

                let entered = Rc::new(Scope {
                    class: Some(ClassContext { fqn, parent }),
                    ..(*self.scope).clone()
                });
                self.with_scope(entered, id);
            }
            NodeKind::Function { kind, name } => {
                if *kind == FunctionKind::Free {
                    self.table.names[id.index()] = Some(self.scope.qualify_declaration(name));
                    // A function declared inside a method body is global.
                    let entered = Rc::new(Scope {
                        class: None,
                        ..(*self.scope).clone()
                    });
                    self.table.scopes[id.index()] = Some(Rc::clone(&entered));
                    self.with_scope(entered, id);
                } else {
                    self.table.names[id.index()] = Some(name.clone());
                    self.table.scopes[id.index()] = Some(Rc::clone(&self.scope));
                    self.visit_children(id);
                }
            }
            NodeKind::TypeReference { name } => {
                let resolved = match self.scope.resolve_class_name(name) {
                    Resolution::Unresolved(original) => {
                        tracing::warn!(name = %original, line = node.line, "unresolved name");
                        self.table.warnings.push(UnresolvedName {
                            name: original.clone(),
                            line: node.line,
                        });
                        original
                    }
                    other => other.into_name(),
                };
                self.table.names[id.index()] = Some(resolved);
            }
            NodeKind::Program | NodeKind::Block => self.visit_children(id),
        }
    }

    fn visit_children(&mut self, id: NodeId) {
        let tree = self.tree;
        for &child in tree.children(id) {
            self.visit(child);
        }
    }

    /// Visit the children of `id` with `entered` as the active scope,
    /// restoring the previous scope afterwards.
    fn with_scope(&mut self, entered: Rc<Scope>, id: NodeId) {
        let saved = std::mem::replace(&mut self.scope, entered);
        self.visit_children(id);
        self.scope = saved;
    }
}
