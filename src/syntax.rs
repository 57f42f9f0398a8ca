//! Owned, arena-indexed syntax tree.
//!
//! The mago AST borrows from a bump arena and the source text, so the
//! parser adapter projects it into this tree once.  Nodes live in a flat
//! `Vec` and are addressed by [`NodeId`]; parent links and resolved names
//! are kept in side tables built by the later passes rather than on the
//! nodes themselves.

/// Index of a node inside a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which flavour of class-like declaration a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassLikeKind {
    Class,
    Interface,
    Trait,
    Enum,
    /// `new class { ... }`, named [`ANONYMOUS_CLASS_NAME`].
    Anonymous,
}

/// The name PHP reports for an anonymous class.  It is never prefixed
/// with the enclosing namespace.
pub const ANONYMOUS_CLASS_NAME: &str = "class@anonymous";

/// How a function-like declaration is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// `function foo() {}` outside a class-like body.
    Free,
    /// A method without the `static` modifier.
    Instance,
    /// A `static` method.
    Static,
}

/// A class import from a `use` statement: `alias` → `fqn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub alias: String,
    pub fqn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Program,
    /// `name` is `None` for `namespace { ... }` (the global namespace).
    Namespace {
        name: Option<String>,
    },
    Import(Vec<Import>),
    ClassLike {
        kind: ClassLikeKind,
        name: String,
        /// Parent class name as written, for `parent` resolution.
        extends: Option<String>,
    },
    Function {
        kind: FunctionKind,
        name: String,
    },
    /// A class name used in `extends`, `implements`, or a type hint.
    TypeReference {
        name: String,
    },
    Block,
}

/// The declaration variants the extraction visitor cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    FreeFunction,
    InstanceMethod,
    StaticMethod,
    Other,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// 1-based source line.
    pub line: u32,
    /// Raw `/** ... */` text attached to this declaration.
    pub docblock: Option<String>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind, line: u32) -> Self {
        Self {
            kind,
            line,
            docblock: None,
            children: Vec::new(),
        }
    }

    pub fn with_docblock(mut self, docblock: Option<String>) -> Self {
        self.docblock = docblock;
        self
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn decl_kind(&self) -> DeclKind {
        match self.kind {
            NodeKind::Function {
                kind: FunctionKind::Free,
                ..
            } => DeclKind::FreeFunction,
            NodeKind::Function {
                kind: FunctionKind::Instance,
                ..
            } => DeclKind::InstanceMethod,
            NodeKind::Function {
                kind: FunctionKind::Static,
                ..
            } => DeclKind::StaticMethod,
            _ => DeclKind::Other,
        }
    }

    pub fn is_class_like(&self) -> bool {
        matches!(self.kind, NodeKind::ClassLike { .. })
    }

    /// The declared short name, if this node declares something.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Namespace { name } => name.as_deref(),
            NodeKind::ClassLike { name, .. }
            | NodeKind::Function { name, .. }
            | NodeKind::TypeReference { name } => Some(name),
            NodeKind::Program | NodeKind::Import(_) | NodeKind::Block => None,
        }
    }
}

/// A rooted tree of [`Node`]s.  The root is always a `Program` node.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Program, 1)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append `node` as the last child of `parent` and return its id.
    pub fn push(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// All nodes in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }
}
