//! Extraction visitor.
//!
//! The last pass over a [`SyntaxTree`].  It visits every node post-order
//! and, for each function or method that carries a docblock, builds the
//! declaration's qualified name and turns the docblock into a
//! [`FunctionType`].
//!
//! Methods are qualified through their parent link rather than through
//! traversal state: `Class->method` for instance methods and
//! `Class::method` for static ones.  A docblock that fails to parse is
//! recorded as a [`Diagnostic`] for that declaration only.

use serde::{Deserialize, Serialize};

use crate::docblock::DocblockParser;
use crate::error::{Diagnostic, DocblockError, UnresolvedName};
use crate::parents::ParentTable;
use crate::resolution::{NameTable, Resolution, Scope};
use crate::syntax::{DeclKind, Node, NodeId, SyntaxTree};
use crate::types::FunctionType;

/// Separator between a class and an instance method.
pub const INSTANCE_SEPARATOR: &str = "->";
/// Separator between a class and a static method.
pub const STATIC_SEPARATOR: &str = "::";

/// Knobs for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// File extensions picked up when walking a directory.
    pub extensions: Vec<String>,
    /// Resolve class names written in docblocks against the
    /// declaration's namespace and imports.
    pub qualify_doc_types: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["php".to_string()],
            qualify_doc_types: false,
        }
    }
}

/// Everything one extraction run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    /// One record per documented declaration, in traversal order.
    pub functions: Vec<FunctionType>,
    /// Declarations whose docblock could not be used.
    pub diagnostics: Vec<Diagnostic>,
    /// Names the resolver had to leave as written.
    pub warnings: Vec<UnresolvedName>,
}

pub struct Extractor<'a> {
    tree: &'a SyntaxTree,
    parents: &'a ParentTable,
    names: &'a NameTable,
    parser: &'a dyn DocblockParser,
    options: &'a ExtractOptions,
}

impl<'a> Extractor<'a> {
    pub fn new(
        tree: &'a SyntaxTree,
        parents: &'a ParentTable,
        names: &'a NameTable,
        parser: &'a dyn DocblockParser,
        options: &'a ExtractOptions,
    ) -> Self {
        Self {
            tree,
            parents,
            names,
            parser,
            options,
        }
    }

    /// Walk the whole tree once and collect the records.
    pub fn run(self) -> Extraction {
        let mut extraction = Extraction {
            warnings: self.names.warnings().to_vec(),
            ..Extraction::default()
        };

        // (node, children already pushed)
        let mut stack = vec![(self.tree.root(), false)];
        while let Some((id, expanded)) = stack.pop() {
            if !expanded {
                stack.push((id, true));
                for &child in self.tree.children(id).iter().rev() {
                    stack.push((child, false));
                }
                continue;
            }
            self.visit(id, &mut extraction);
        }

        tracing::debug!(
            functions = extraction.functions.len(),
            diagnostics = extraction.diagnostics.len(),
            "extraction finished"
        );
        extraction
    }

    fn visit(&self, id: NodeId, extraction: &mut Extraction) {
        let node = self.tree.node(id);
        let separator = match node.decl_kind() {
            DeclKind::Other => return,
            DeclKind::FreeFunction => None,
            DeclKind::InstanceMethod => Some(INSTANCE_SEPARATOR),
            DeclKind::StaticMethod => Some(STATIC_SEPARATOR),
        };
        let Some(docblock) = node.docblock.as_deref().filter(|d| !d.trim().is_empty()) else {
            return;
        };

        let name = match separator {
            Some(separator) => self.method_name(id, node, separator),
            None => self.declared_name(id, node),
        };

        match self.build(name.clone(), docblock, self.names.scope(id)) {
            Ok(function) => extraction.functions.push(function),
            Err(error) => {
                tracing::warn!(
                    declaration = %name,
                    line = node.line,
                    %error,
                    "skipping declaration with unusable docblock"
                );
                extraction.diagnostics.push(Diagnostic {
                    declaration: name,
                    line: node.line,
                    error,
                });
            }
        }
    }

    fn build(
        &self,
        name: String,
        docblock: &str,
        scope: Option<&Scope>,
    ) -> Result<FunctionType, DocblockError> {
        let doc = self.parser.parse(docblock)?;
        let mut function = FunctionType::new(name, &doc.params, &doc.returns)?;

        if self.options.qualify_doc_types
            && let Some(scope) = scope
        {
            function.qualify_types(|type_name| qualify_doc_type(scope, type_name));
        }
        Ok(function)
    }

    fn declared_name(&self, id: NodeId, node: &Node) -> String {
        self.names
            .name(id)
            .or_else(|| node.name())
            .unwrap_or_default()
            .to_string()
    }

    fn method_name(&self, id: NodeId, node: &Node, separator: &str) -> String {
        let method = node.name().unwrap_or_default();
        match self.parents.parent(id) {
            Some(parent) if self.tree.node(parent).is_class_like() => {
                let class = self
                    .names
                    .name(parent)
                    .or_else(|| self.tree.node(parent).name())
                    .unwrap_or_default();
                format!("{}{}{}", class, separator, method)
            }
            _ => self.declared_name(id, node),
        }
    }
}

/// Whether a docblock type is a bare class name (`Foo`, `\A\B`, `self`)
/// as opposed to a compound like `?Foo` or `array<int, Foo>`.
fn is_plain_class_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '\\')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

fn qualify_doc_type(scope: &Scope, type_name: &str) -> String {
    if !is_plain_class_name(type_name) {
        return type_name.to_string();
    }
    match scope.resolve_class_name(type_name) {
        Resolution::Resolved(fqn) => fqn,
        Resolution::Builtin(_) | Resolution::Unresolved(_) => type_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docblock::{PhpDoc, PhpDocParser};
    use crate::parents::link_parents;
    use crate::parser::parse_source;
    use crate::resolution::resolve_names;
    use crate::syntax::{FunctionKind, NodeKind};
    use crate::types::TypeSet;

    fn run_with(source: &str, options: &ExtractOptions) -> Extraction {
        let tree = parse_source(source).unwrap();
        let parents = link_parents(&tree);
        let names = resolve_names(&tree);
        Extractor::new(&tree, &parents, &names, &PhpDocParser, options).run()
    }

    fn run(source: &str) -> Extraction {
        run_with(source, &ExtractOptions::default())
    }

    fn set(names: &[&str]) -> TypeSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn names(extraction: &Extraction) -> Vec<&str> {
        extraction
            .functions
            .iter()
            .map(|f| f.name.as_str())
            .collect()
    }

    #[test]
    fn free_function_with_union_return() {
        let out = run("<?php\n/** @return ClassA|ClassB */\nfunction my_func() {}\n");
        assert_eq!(out.functions.len(), 1);
        let f = &out.functions[0];
        assert_eq!(f.name, "my_func");
        assert!(f.params.is_empty());
        assert_eq!(f.returns, set(&["ClassA", "ClassB"]));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn instance_method_uses_arrow_separator() {
        let out = run(concat!(
            "<?php\n",
            "class ClassA {\n",
            "    /** @param ClassX $a @return ClassY */\n",
            "    public function foo($a) {}\n",
            "}\n",
        ));
        assert_eq!(out.functions.len(), 1);
        let f = &out.functions[0];
        assert_eq!(f.name, "ClassA->foo");
        assert_eq!(f.params, vec![set(&["ClassX"])]);
        assert_eq!(f.returns, set(&["ClassY"]));
    }

    #[test]
    fn static_and_instance_methods_are_distinguished() {
        let out = run(concat!(
            "<?php\n",
            "namespace App\\Model;\n",
            "class C {\n",
            "    /** @return int */\n",
            "    public function m() {}\n",
            "    /** @return int */\n",
            "    public static function sm() {}\n",
            "}\n",
        ));
        assert_eq!(names(&out), vec!["App\\Model\\C->m", "App\\Model\\C::sm"]);
    }

    #[test]
    fn undocumented_declarations_produce_nothing() {
        let out = run(concat!(
            "<?php\n",
            "function a() {}\n",
            "// not a docblock\n",
            "function b() {}\n",
            "/* also not */\n",
            "function c() {}\n",
            "class K { public function m() {} }\n",
        ));
        assert!(out.functions.is_empty());
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn malformed_docblock_only_affects_its_declaration() {
        let out = run(concat!(
            "<?php\n",
            "class Svc {\n",
            "    /** @return Good */\n",
            "    public function before() {}\n",
            "    /** @param array<int $x */\n",
            "    public function broken($x) {}\n",
            "    /** @return Good */\n",
            "    public function after() {}\n",
            "}\n",
        ));
        assert_eq!(names(&out), vec!["Svc->before", "Svc->after"]);
        assert_eq!(out.diagnostics.len(), 1);
        let diag = &out.diagnostics[0];
        assert_eq!(diag.declaration, "Svc->broken");
        assert_eq!(diag.line, 6);
        assert!(matches!(diag.error, DocblockError::InvalidType { .. }));
    }

    #[test]
    fn multiple_return_tags_are_a_diagnostic() {
        let out = run("<?php\n/**\n * @return A\n * @return B\n */\nfunction f() {}\n");
        assert!(out.functions.is_empty());
        assert_eq!(
            out.diagnostics[0].error,
            DocblockError::MultipleReturnTags { count: 2 }
        );
    }

    #[test]
    fn nested_function_is_emitted_before_its_container() {
        let out = run(concat!(
            "<?php\n",
            "/** @return int */\n",
            "function outer() {\n",
            "    /** @return int */\n",
            "    function inner() {}\n",
            "}\n",
            "/** @return int */\n",
            "function last() {}\n",
        ));
        assert_eq!(names(&out), vec!["inner", "outer", "last"]);
    }

    #[test]
    fn doc_types_are_qualified_on_request() {
        let source = concat!(
            "<?php\n",
            "namespace App;\n",
            "use Lib\\Entity\\User;\n",
            "class Repo {\n",
            "    /** @param User|null $u @return self|Local|?User */\n",
            "    public function save($u) {}\n",
            "}\n",
        );

        let plain = run(source);
        assert_eq!(plain.functions[0].params, vec![set(&["User", "null"])]);

        let options = ExtractOptions {
            qualify_doc_types: true,
            ..ExtractOptions::default()
        };
        let qualified = run_with(source, &options);
        let f = &qualified.functions[0];
        assert_eq!(f.params, vec![set(&["Lib\\Entity\\User", "null"])]);
        assert_eq!(f.returns, set(&["App\\Repo", "App\\Local", "?User"]));
    }

    #[test]
    fn method_outside_class_like_falls_back_to_own_name() {
        let mut tree = SyntaxTree::new();
        let root = tree.root();
        let block = tree.push(root, Node::new(NodeKind::Block, 1));
        tree.push(
            block,
            Node::new(
                NodeKind::Function {
                    kind: FunctionKind::Static,
                    name: "orphan".into(),
                },
                2,
            )
            .with_docblock(Some("/** @return int */".into())),
        );

        let parents = link_parents(&tree);
        let names = resolve_names(&tree);
        let options = ExtractOptions::default();
        let out = Extractor::new(&tree, &parents, &names, &PhpDocParser, &options).run();
        assert_eq!(names_of(&out), vec!["orphan"]);
    }

    #[test]
    fn documented_non_function_nodes_are_ignored() {
        let mut tree = SyntaxTree::new();
        let root = tree.root();
        let class = tree.push(
            root,
            Node::new(
                NodeKind::ClassLike {
                    kind: crate::syntax::ClassLikeKind::Class,
                    name: "Documented".into(),
                    extends: None,
                },
                2,
            )
            .with_docblock(Some("/** @return int */".into())),
        );
        tree.push(
            class,
            Node::new(NodeKind::Block, 3).with_docblock(Some("/** @param int $x */".into())),
        );

        let parents = link_parents(&tree);
        let names = resolve_names(&tree);
        let options = ExtractOptions::default();
        let out = Extractor::new(&tree, &parents, &names, &PhpDocParser, &options).run();
        assert!(out.functions.is_empty());
        assert!(out.diagnostics.is_empty());
    }

    fn names_of(extraction: &Extraction) -> Vec<String> {
        extraction.functions.iter().map(|f| f.name.clone()).collect()
    }

    struct FailingParser;

    impl DocblockParser for FailingParser {
        fn parse(&self, docblock: &str) -> Result<PhpDoc, DocblockError> {
            if docblock.contains("fail") {
                Err(DocblockError::Unterminated)
            } else {
                PhpDocParser.parse(docblock)
            }
        }
    }

    #[test]
    fn parser_failures_never_yield_empty_records() {
        let tree = parse_source(concat!(
            "<?php\n",
            "/** fail */\n",
            "function a() {}\n",
            "/** @return int */\n",
            "function b() {}\n",
        ))
        .unwrap();
        let parents = link_parents(&tree);
        let names = resolve_names(&tree);
        let options = ExtractOptions::default();
        let out = Extractor::new(&tree, &parents, &names, &FailingParser, &options).run();

        assert_eq!(names_of(&out), vec!["b"]);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].declaration, "a");
    }

    #[test]
    fn runs_are_deterministic() {
        let source = "<?php\nclass A {\n/** @param Z|Y|X $a @return C|B|A */\npublic function f($a) {}\n}\n";
        let first: Vec<String> = run(source).functions.iter().map(|f| f.to_string()).collect();
        let second: Vec<String> = run(source).functions.iter().map(|f| f.to_string()).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["A->f; A,B,C; X,Y,Z; "]);
    }
}
