//! Layout tree: arena of [`LayoutNode`]s built from a source document.
//!
//! Nodes are packed children-first, so arena order is a post-order walk and
//! the root is always the last entry. That order gives the passes of
//! [`LayoutTree::refresh`] their direction for free: a forward sweep sees
//! every child before its parent (measure), a reverse sweep sees every parent
//! before its children (absolute positions).

use super::arrange::{measure_header, pack_children, LayoutParams};
use super::metrics::FontSpec;
use super::node::{LayoutNode, NodeIndex};
use super::policy::ExpandPolicy;
use crate::model::{MarkerMap, NodeId, Point, Size, SourceNode, ViewError};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Inputs of a layout refresh.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    /// Arrangement geometry.
    pub params: &'a LayoutParams,
    /// Font used for header text; `None` fails the refresh.
    pub font: Option<&'a FontSpec>,
    /// Initial expansion for nodes absent from `expanded`.
    pub policy: &'a dyn ExpandPolicy,
    /// Persisted expansion state by node id.
    pub expanded: &'a BTreeMap<NodeId, bool>,
    /// Marker overlay by node id.
    pub markers: &'a MarkerMap,
}

/// Arena-backed layout tree with id lookup and a flattened render order.
#[derive(Debug, Clone)]
pub struct LayoutTree {
    nodes: Vec<LayoutNode>,
    lookup: HashMap<NodeId, NodeIndex>,
    root: NodeIndex,
    flat: Vec<NodeIndex>,
    selected: Option<NodeId>,
}

impl LayoutTree {
    /// Build a tree from `source` and run a first [`refresh`](Self::refresh).
    ///
    /// Ids must be unique within a document; a repeated id is logged and its
    /// whole subtree skipped.
    ///
    /// # Errors
    ///
    /// Propagates [`ViewError::Config`] from text measurement.
    pub fn from_source(source: &SourceNode, ctx: &LayoutContext<'_>) -> Result<Self, ViewError> {
        let mut nodes = Vec::with_capacity(source.subtree_len());
        let mut seen = HashSet::new();
        let root = pack(&mut nodes, &mut seen, source, 0);
        // the root id is always fresh
        let root = root.unwrap_or_else(|| NodeIndex::new(nodes.len().saturating_sub(1)));

        let lookup = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), NodeIndex::new(i)))
            .collect();

        let mut tree = Self {
            nodes,
            lookup,
            root,
            flat: Vec::new(),
            selected: None,
        };
        tree.refresh(ctx)?;
        Ok(tree)
    }

    /// Re-run auto-expand, measure/arrange, absolute positioning and
    /// flattening, in that order, on the existing nodes.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Config`] when `ctx.font` is `None`.
    pub fn refresh(&mut self, ctx: &LayoutContext<'_>) -> Result<(), ViewError> {
        self.auto_expand(ctx);
        self.measure_and_arrange(ctx)?;
        self.calculate_absolute_positions();
        self.flatten(ctx.params.show_root);
        debug!(
            nodes = self.nodes.len(),
            visible = self.flat.len(),
            "layout refreshed"
        );
        Ok(())
    }

    fn auto_expand(&mut self, ctx: &LayoutContext<'_>) {
        for node in &mut self.nodes {
            let expanded = match ctx.expanded.get(&node.id) {
                Some(expanded) => *expanded,
                None => ctx.policy.initially_expanded(node),
            };
            node.is_expanded = expanded;
        }
    }

    fn measure_and_arrange(&mut self, ctx: &LayoutContext<'_>) -> Result<(), ViewError> {
        for i in 0..self.nodes.len() {
            let header_width =
                measure_header(&mut self.nodes[i], ctx.params, ctx.font, ctx.markers)?;

            let children = self.nodes[i].visible_children().to_vec();
            let sizes: Vec<(f64, f64)> = children
                .iter()
                .map(|c| {
                    let child = &self.nodes[c.get()];
                    (child.width, child.height)
                })
                .collect();

            let offsets = pack_children(&mut self.nodes[i], header_width, &sizes, ctx.params);
            for (child, offset) in children.iter().zip(offsets) {
                self.nodes[child.get()].rel = offset;
            }
        }
        Ok(())
    }

    fn calculate_absolute_positions(&mut self) {
        for i in (0..self.nodes.len()).rev() {
            let abs = match self.nodes[i].parent {
                Some(parent) => {
                    let base = self.nodes[parent.get()].abs;
                    let rel = self.nodes[i].rel;
                    base.offset(rel.x, rel.y)
                }
                None => Point::ZERO,
            };
            self.nodes[i].abs = abs;
        }
    }

    fn flatten(&mut self, show_root: bool) {
        self.flat.clear();
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            self.flat.push(index);
            stack.extend(self.nodes[index.get()].visible_children().iter().rev());
        }
        if !show_root && !self.flat.is_empty() {
            self.flat.remove(0);
        }
    }

    /// Root node.
    pub fn root(&self) -> &LayoutNode {
        &self.nodes[self.root.get()]
    }

    /// Size of the whole diagram (the root's box).
    pub fn content_size(&self) -> Size {
        self.root().size()
    }

    /// Node by arena index.
    pub fn node(&self, index: NodeIndex) -> &LayoutNode {
        &self.nodes[index.get()]
    }

    /// Node by id. Hidden and root nodes are found too.
    pub fn get(&self, id: &NodeId) -> Option<&LayoutNode> {
        self.lookup.get(id).map(|index| self.node(*index))
    }

    /// Whether `id` is part of the tree.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.lookup.contains_key(id)
    }

    /// Total number of nodes, visible or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in render order: pre-order, skipping collapsed subtrees and,
    /// when hidden, the root.
    pub fn flattened(&self) -> impl Iterator<Item = &LayoutNode> + '_ {
        self.flat.iter().map(|index| self.node(*index))
    }

    /// Ids of [`flattened`](Self::flattened), in order.
    pub fn flat_ids(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.flattened().map(LayoutNode::id)
    }

    /// Whether `id` is in the flattened sequence.
    pub fn is_visible(&self, id: &NodeId) -> bool {
        self.lookup
            .get(id)
            .is_some_and(|index| self.flat.contains(index))
    }

    /// Current selection, if it is part of this tree.
    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// Whether `id` is the selected node.
    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// Replace the selection and return the previous one.
    ///
    /// Ids unknown to the tree are kept: the selection may refer to a node of
    /// a later snapshot.
    pub fn set_selected(&mut self, id: Option<NodeId>) -> Option<NodeId> {
        std::mem::replace(&mut self.selected, id)
    }
}

fn pack(
    nodes: &mut Vec<LayoutNode>,
    seen: &mut HashSet<NodeId>,
    source: &SourceNode,
    depth: usize,
) -> Option<NodeIndex> {
    if !seen.insert(source.id.clone()) {
        warn!(id = %source.id, "duplicate node id, subtree skipped");
        return None;
    }

    let children: Vec<NodeIndex> = source
        .children
        .iter()
        .filter_map(|child| pack(nodes, seen, child, depth + 1))
        .collect();

    let index = NodeIndex::new(nodes.len());
    for child in &children {
        nodes[child.get()].parent = Some(index);
    }

    let mut node = LayoutNode::from_source(source, depth);
    node.children = children;
    nodes.push(node);
    Some(index)
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
