//! Layout node - one tree entity with computed geometry and decorations.

use super::decoration::{Decoration, DecorationKind, Decorations, Header, HeaderSlot, Severity};
use crate::model::{NodeId, Point, Rect, Size, SourceNode};
use serde::Serialize;
use std::collections::BTreeMap;

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw arena position.
    pub fn get(&self) -> usize {
        self.0
    }
}

/// Colors of a node, resolved from its depth.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NodePalette {
    /// Body background.
    pub bg_fill: String,
    /// Body stroke.
    pub stroke: String,
    /// Header background.
    pub header_bg_fill: String,
    /// Header highlight strip.
    pub header_fill: String,
}

/// A node of the layout tree.
///
/// Geometry is filled in by the arrange pass: sizes bottom-up, relative
/// offsets while packing the parent, absolute positions top-down.
/// The parent owns its children through the arena indices in `children`.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub(crate) id: NodeId,
    pub(crate) kind: String,
    pub(crate) name: String,
    pub(crate) data: serde_json::Value,
    pub(crate) depth: usize,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) children: Vec<NodeIndex>,
    pub(crate) is_expanded: bool,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) header_height: f64,
    pub(crate) rel: Point,
    pub(crate) abs: Point,
    pub(crate) headers: Vec<Header>,
    pub(crate) decorations: Decorations,
    pub(crate) severity: BTreeMap<Severity, u64>,
    pub(crate) flags: Vec<String>,
    pub(crate) palette: NodePalette,
}

impl LayoutNode {
    /// Build a node from its source record ("prepare"): copies identity and
    /// extracts the decoration-relevant payload. Geometry starts at zero.
    pub(crate) fn from_source(source: &SourceNode, depth: usize) -> Self {
        Self {
            id: source.id.clone(),
            kind: source.kind.clone(),
            name: source.display_name().to_string(),
            data: source.data.clone(),
            depth,
            parent: None,
            children: Vec::new(),
            is_expanded: false,
            width: 0.0,
            height: 0.0,
            header_height: 0.0,
            rel: Point::ZERO,
            abs: Point::ZERO,
            headers: Vec::new(),
            decorations: Decorations::default(),
            severity: parse_severity(&source.data),
            flags: parse_flags(&source.data),
            palette: NodePalette::default(),
        }
    }

    /// Stable identity.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Entity kind.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw source payload.
    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    /// Depth below the root (root = 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Parent index, `None` for the root.
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// All children, in source order.
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    /// Whether the node has any children at all.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Children materialized in the view: all children while expanded, none
    /// while collapsed.
    pub fn visible_children(&self) -> &[NodeIndex] {
        if self.is_expanded {
            &self.children
        } else {
            &[]
        }
    }

    /// Expansion state.
    pub fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    /// Width in pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Size in pixels.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Header band height.
    pub fn header_height(&self) -> f64 {
        self.header_height
    }

    /// Offset from the parent's origin.
    pub fn rel_pos(&self) -> Point {
        self.rel
    }

    /// Absolute world position.
    pub fn abs_pos(&self) -> Point {
        self.abs
    }

    /// Absolute world bounds.
    pub fn abs_rect(&self) -> Rect {
        Rect::from_origin(self.abs, self.size())
    }

    /// Resolved colors.
    pub fn palette(&self) -> &NodePalette {
        &self.palette
    }

    /// Alert counts by severity (zero counts omitted).
    pub fn severity_counts(&self) -> &BTreeMap<Severity, u64> {
        &self.severity
    }

    /// Flag names, in source order.
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// All decorations.
    pub fn decorations(&self) -> &Decorations {
        &self.decorations
    }

    /// Decorations of one kind.
    pub fn decorations_of(&self, kind: DecorationKind) -> &[Decoration] {
        self.decorations.of(kind)
    }

    /// Header element in `slot`, if the node has one.
    pub fn header(&self, slot: HeaderSlot) -> Option<&Header> {
        self.headers.iter().find(|h| h.slot == slot)
    }

    /// Header bounds; a zero rectangle when the slot is empty.
    pub fn header_rect(&self, slot: HeaderSlot) -> Rect {
        self.header(slot).map(|h| h.rect).unwrap_or_default()
    }

    /// Header label; empty when the slot is empty or has no text.
    pub fn header_text(&self, slot: HeaderSlot) -> &str {
        self.header(slot)
            .and_then(|h| h.text.as_deref())
            .unwrap_or("")
    }
}

fn parse_severity(data: &serde_json::Value) -> BTreeMap<Severity, u64> {
    let Some(counts) = data.get("severity").and_then(serde_json::Value::as_object) else {
        return BTreeMap::new();
    };
    Severity::ALL
        .into_iter()
        .filter_map(|severity| {
            counts
                .get(severity.as_str())
                .and_then(serde_json::Value::as_u64)
                .filter(|count| *count > 0)
                .map(|count| (severity, count))
        })
        .collect()
}

fn parse_flags(data: &serde_json::Value) -> Vec<String> {
    data.get("flags")
        .and_then(serde_json::Value::as_array)
        .map(|flags| {
            flags
                .iter()
                .filter_map(serde_json::Value::as_str)
                .fold(Vec::new(), |mut names: Vec<String>, name| {
                    if !names.iter().any(|n| n == name) {
                        names.push(name.to_string());
                    }
                    names
                })
        })
        .unwrap_or_default()
}
