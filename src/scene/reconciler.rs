//! Keyed scene reconciliation.
//!
//! Each pass diffs the registry against the tree's flattened sequence:
//! elements of removed ids are destroyed, added ids get fresh elements, and
//! retained ids keep their element identity. Attributes are then pushed for
//! every visible node, skipping nodes whose attributes did not change since
//! the last push.
//!
//! A [`UpdateMode::Full`] pass also diffs every node's decorations by
//! [`DecorationKey`](crate::layout::DecorationKey). A
//! [`UpdateMode::Partial`] pass leaves decorations of retained nodes alone;
//! freshly created nodes always receive their decorations.

use super::backend::{
    ElementHandle, Layer, MinimapNodeAttrs, NodeAttrs, RenderBackend, Transition,
};
use super::registry::{
    diff_keys, DecorationRecord, ElementRecord, MinimapRecord, RenderRegistry,
};
use crate::layout::{Bindings, LayoutNode, LayoutTree};
use crate::model::NodeId;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::debug;

/// Default length of attribute transitions.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(200);

/// Scope of a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Structure, attributes and decorations.
    Full,
    /// Structure and attributes only.
    Partial,
}

/// Backend operations issued by one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Elements created, both layers.
    pub created: usize,
    /// Elements destroyed, both layers.
    pub destroyed: usize,
    /// Attribute updates sent, both layers.
    pub updated: usize,
    /// Attribute updates skipped as unchanged, both layers.
    pub unchanged: usize,
    /// Decoration elements created.
    pub decorations_created: usize,
    /// Decoration elements destroyed.
    pub decorations_destroyed: usize,
    /// Decoration updates sent.
    pub decorations_updated: usize,
}

impl ReconcileStats {
    /// Whether the pass sent anything to the backend.
    pub fn has_changes(&self) -> bool {
        self.created
            + self.destroyed
            + self.updated
            + self.decorations_created
            + self.decorations_destroyed
            + self.decorations_updated
            > 0
    }
}

/// Owns the render registry and keeps it in step with a layout tree.
#[derive(Debug, Clone)]
pub struct Reconciler {
    registry: RenderRegistry,
    transition: Duration,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSITION)
    }
}

impl Reconciler {
    /// Empty reconciler animating attribute changes over `transition`.
    pub fn new(transition: Duration) -> Self {
        Self {
            registry: RenderRegistry::new(),
            transition,
        }
    }

    /// Live elements.
    pub fn registry(&self) -> &RenderRegistry {
        &self.registry
    }

    /// Reconcile the backend with `tree`'s flattened sequence.
    pub fn sync<B>(&mut self, tree: &LayoutTree, mode: UpdateMode, backend: &mut B) -> ReconcileStats
    where
        B: RenderBackend + ?Sized,
    {
        let mut stats = ReconcileStats::default();
        let ids: Vec<&NodeId> = tree.flat_ids().collect();

        let main = diff_keys(&self.registry.main, ids.iter().copied());
        for id in &main.removed {
            if let Some(record) = self.registry.main.remove(id) {
                backend.destroy_element(record.handle);
                stats.destroyed += 1;
            }
        }
        for id in &main.added {
            let handle = backend.create_element(Layer::Main, id, &Bindings::for_header(id));
            self.registry
                .main
                .insert(id.clone(), ElementRecord::new(handle));
            stats.created += 1;
        }

        let minimap = diff_keys(&self.registry.minimap, ids.iter().copied());
        for id in &minimap.removed {
            if let Some(record) = self.registry.minimap.remove(id) {
                backend.destroy_element(record.handle);
                stats.destroyed += 1;
            }
        }
        for id in &minimap.added {
            let handle = backend.create_element(Layer::Minimap, id, &Bindings::default());
            self.registry
                .minimap
                .insert(id.clone(), MinimapRecord { handle, attrs: None });
            stats.created += 1;
        }

        let fresh: BTreeSet<&NodeId> = main.added.iter().collect();
        for node in tree.flattened() {
            let selected = tree.is_selected(node.id());
            self.update_main(node, selected, backend, &mut stats);
            if mode == UpdateMode::Full || fresh.contains(node.id()) {
                self.sync_decorations(node, backend, &mut stats);
            }
            self.update_minimap(node, selected, backend, &mut stats);
        }

        debug!(?mode, ?stats, "scene reconciled");
        stats
    }

    /// Refresh the attributes of the given nodes only.
    ///
    /// Used for selection changes: only the previously and newly selected
    /// nodes change appearance. Ids that are not visible are skipped.
    pub fn update_nodes<'a, B>(
        &mut self,
        tree: &LayoutTree,
        ids: impl IntoIterator<Item = &'a NodeId>,
        backend: &mut B,
    ) -> ReconcileStats
    where
        B: RenderBackend + ?Sized,
    {
        let mut stats = ReconcileStats::default();
        for id in ids {
            let Some(node) = tree.get(id) else {
                continue;
            };
            let selected = tree.is_selected(id);
            self.update_main(node, selected, backend, &mut stats);
            self.update_minimap(node, selected, backend, &mut stats);
        }
        stats
    }

    fn transition_for<T>(&self, previous: Option<&T>) -> Transition {
        match previous {
            None => Transition::Immediate,
            Some(_) => Transition::Timed(self.transition),
        }
    }

    fn update_main<B>(
        &mut self,
        node: &LayoutNode,
        selected: bool,
        backend: &mut B,
        stats: &mut ReconcileStats,
    ) where
        B: RenderBackend + ?Sized,
    {
        let transition = match self.registry.main.get(node.id()) {
            Some(record) => self.transition_for(record.attrs.as_ref()),
            None => return,
        };
        let Some(record) = self.registry.main.get_mut(node.id()) else {
            return;
        };

        let attrs = NodeAttrs::for_node(node, selected);
        if record.attrs.as_ref() == Some(&attrs) {
            stats.unchanged += 1;
            return;
        }
        backend.update_node(record.handle, &attrs, transition);
        record.attrs = Some(attrs);
        stats.updated += 1;
    }

    fn update_minimap<B>(
        &mut self,
        node: &LayoutNode,
        selected: bool,
        backend: &mut B,
        stats: &mut ReconcileStats,
    ) where
        B: RenderBackend + ?Sized,
    {
        let transition = match self.registry.minimap.get(node.id()) {
            Some(record) => self.transition_for(record.attrs.as_ref()),
            None => return,
        };
        let Some(record) = self.registry.minimap.get_mut(node.id()) else {
            return;
        };

        let attrs = MinimapNodeAttrs::for_node(node, selected);
        if record.attrs.as_ref() == Some(&attrs) {
            stats.unchanged += 1;
            return;
        }
        backend.update_minimap_node(record.handle, &attrs, transition);
        record.attrs = Some(attrs);
        stats.updated += 1;
    }

    fn sync_decorations<B>(&mut self, node: &LayoutNode, backend: &mut B, stats: &mut ReconcileStats)
    where
        B: RenderBackend + ?Sized,
    {
        let timed = Transition::Timed(self.transition);
        let Some(record) = self.registry.main.get_mut(node.id()) else {
            return;
        };
        let parent: ElementHandle = record.handle;

        let diff = diff_keys(&record.decorations, node.decorations().iter().map(|d| &d.key));
        for key in &diff.removed {
            if let Some(gone) = record.decorations.remove(key) {
                backend.destroy_decoration(gone.handle);
                stats.decorations_destroyed += 1;
            }
        }

        for decoration in node.decorations().iter() {
            match record.decorations.get_mut(&decoration.key) {
                Some(existing) if existing.last == *decoration => {}
                Some(existing) => {
                    backend.update_decoration(existing.handle, decoration, timed);
                    existing.last = decoration.clone();
                    stats.decorations_updated += 1;
                }
                None => {
                    let handle = backend.create_decoration(
                        parent,
                        decoration,
                        &decoration.bindings(node.id()),
                    );
                    backend.update_decoration(handle, decoration, Transition::Immediate);
                    record.decorations.insert(
                        decoration.key.clone(),
                        DecorationRecord {
                            handle,
                            last: decoration.clone(),
                        },
                    );
                    stats.decorations_created += 1;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
