//! Render registry: node id to live backend element.
//!
//! Each record remembers the attributes last pushed to the backend, so the
//! reconciler can skip updates that would not change anything.

use super::backend::{ElementHandle, MinimapNodeAttrs, NodeAttrs};
use crate::layout::{Decoration, DecorationKey};
use crate::model::NodeId;
use std::collections::{BTreeMap, BTreeSet};

/// A live decoration element.
#[derive(Debug, Clone, PartialEq)]
pub struct DecorationRecord {
    /// Backend handle.
    pub handle: ElementHandle,
    /// Last applied decoration.
    pub last: Decoration,
}

/// A live main-layer node element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementRecord {
    /// Backend handle.
    pub handle: ElementHandle,
    /// Last applied attributes; `None` until the first update.
    pub attrs: Option<NodeAttrs>,
    /// Decoration sub-registry.
    pub decorations: BTreeMap<DecorationKey, DecorationRecord>,
}

impl ElementRecord {
    pub(crate) fn new(handle: ElementHandle) -> Self {
        Self {
            handle,
            attrs: None,
            decorations: BTreeMap::new(),
        }
    }
}

/// A live minimap node element.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimapRecord {
    /// Backend handle.
    pub handle: ElementHandle,
    /// Last applied attributes; `None` until the first update.
    pub attrs: Option<MinimapNodeAttrs>,
}

/// Result of diffing a keyed map against the next key sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDiff<K> {
    /// Keys present now but not next, in map order.
    pub removed: Vec<K>,
    /// Keys present next but not now, in sequence order.
    pub added: Vec<K>,
    /// Keys present in both, in sequence order.
    pub retained: Vec<K>,
}

/// Set-difference of `current`'s keys against `next`.
///
/// Duplicate keys in `next` count once.
pub fn diff_keys<'a, K, V>(
    current: &BTreeMap<K, V>,
    next: impl IntoIterator<Item = &'a K>,
) -> KeyDiff<K>
where
    K: Ord + Clone + 'a,
{
    let mut seen = BTreeSet::new();
    let mut added = Vec::new();
    let mut retained = Vec::new();
    for key in next {
        if !seen.insert(key.clone()) {
            continue;
        }
        if current.contains_key(key) {
            retained.push(key.clone());
        } else {
            added.push(key.clone());
        }
    }
    let removed = current
        .keys()
        .filter(|key| !seen.contains(*key))
        .cloned()
        .collect();
    KeyDiff {
        removed,
        added,
        retained,
    }
}

/// Node elements of both layers, keyed by node id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderRegistry {
    pub(crate) main: BTreeMap<NodeId, ElementRecord>,
    pub(crate) minimap: BTreeMap<NodeId, MinimapRecord>,
}

impl RenderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Main-layer record of `id`.
    pub fn main(&self, id: &NodeId) -> Option<&ElementRecord> {
        self.main.get(id)
    }

    /// Minimap record of `id`.
    pub fn minimap(&self, id: &NodeId) -> Option<&MinimapRecord> {
        self.minimap.get(id)
    }

    /// Ids with a main-layer element, sorted.
    pub fn main_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.main.keys()
    }

    /// Ids with a minimap element, sorted.
    pub fn minimap_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.minimap.keys()
    }

    /// Number of main-layer elements.
    pub fn len(&self) -> usize {
        self.main.len()
    }

    /// Whether no elements are registered.
    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.minimap.is_empty()
    }
}
