//! Initial expansion policy.
//!
//! Before any user interaction, whether a node starts expanded is a pluggable
//! decision. Persisted expansion state always wins over the policy; the policy
//! only answers for nodes the user never toggled.

use super::node::LayoutNode;

/// Decides the initial expansion state of nodes without persisted state.
pub trait ExpandPolicy {
    /// Whether `node` starts expanded.
    fn initially_expanded(&self, node: &LayoutNode) -> bool;
}

/// Expand every node shallower than `max_depth`.
///
/// `max_depth = 1` expands only the root, `0` collapses everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthExpandPolicy {
    /// Depth (root = 0) below which nodes start expanded.
    pub max_depth: usize,
}

impl Default for DepthExpandPolicy {
    fn default() -> Self {
        Self { max_depth: 1 }
    }
}

impl ExpandPolicy for DepthExpandPolicy {
    fn initially_expanded(&self, node: &LayoutNode) -> bool {
        node.depth() < self.max_depth
    }
}

impl<F> ExpandPolicy for F
where
    F: Fn(&LayoutNode) -> bool,
{
    fn initially_expanded(&self, node: &LayoutNode) -> bool {
        self(node)
    }
}
