//! Marker overlay data published through the shared-state store.

use super::identifiers::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user-defined marker attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Marker name; the logical key of the marker decoration.
    pub name: String,
    /// Short glyph drawn inside the marker box.
    pub glyph: String,
    /// Glyph color.
    pub color: String,
}

impl Marker {
    /// Create a marker.
    pub fn new(name: impl Into<String>, glyph: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            glyph: glyph.into(),
            color: color.into(),
        }
    }
}

/// Marker overlay: node id to the markers shown on that node.
///
/// Replaced wholesale whenever the store publishes new marker data.
pub type MarkerMap = BTreeMap<NodeId, Vec<Marker>>;
