//! Parent-linking pass.
//!
//! Records, for every node of a [`SyntaxTree`], the node it is nested in.
//! The result is a side table indexed by [`NodeId`]; the tree itself is
//! not touched.

use crate::syntax::{NodeId, SyntaxTree};

/// Immediate syntactic parent of every node.
#[derive(Debug, Clone)]
pub struct ParentTable {
    parents: Vec<Option<NodeId>>,
}

impl ParentTable {
    /// The immediate parent of `id`, or `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.index()).copied().flatten()
    }

    /// Ancestors of `id`, nearest first.  Does not include `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }
}

/// Walk `tree` pre-order and record each child's parent before
/// descending into it.
pub fn link_parents(tree: &SyntaxTree) -> ParentTable {
    let mut parents = vec![None; tree.len()];
    let mut stack = vec![tree.root()];

    while let Some(id) = stack.pop() {
        // Push in reverse so siblings are visited in source order.
        for &child in tree.children(id).iter().rev() {
            debug_assert!(parents[child.index()].is_none(), "node linked twice");
            parents[child.index()] = Some(id);
            stack.push(child);
        }
    }

    tracing::debug!(nodes = parents.len(), "linked parents");
    ParentTable { parents }
}
