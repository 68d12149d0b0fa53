//! Node decorations and header slots.
//!
//! Decorations are small overlays attached to a node (expander affordance,
//! severity badges, flags, markers). They change independently of the node's
//! structural layout and are diffed by the reconciler with their own keys.
//!
//! Lookups are typed: a closed [`DecorationKind`] selects the decoration list
//! and a closed [`HeaderSlot`] selects a header element. Absent headers are
//! not errors; the accessors on [`LayoutNode`](super::LayoutNode) return
//! neutral values instead.

use crate::model::{NodeId, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of decoration kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecorationKind {
    /// Expand/collapse affordance.
    Expander,
    /// Severity badge background.
    Severity,
    /// Severity badge count text.
    SeverityText,
    /// Boolean flag icon.
    Flag,
    /// User marker.
    Marker,
}

impl DecorationKind {
    /// Every kind, in render order.
    pub const ALL: [DecorationKind; 5] = [
        DecorationKind::Expander,
        DecorationKind::Severity,
        DecorationKind::SeverityText,
        DecorationKind::Flag,
        DecorationKind::Marker,
    ];

    /// Class name of the rendered element.
    pub fn class_name(self) -> &'static str {
        match self {
            DecorationKind::Expander => "node-expander",
            DecorationKind::Severity => "node-severity",
            DecorationKind::SeverityText => "node-severity-text",
            DecorationKind::Flag => "node-flag",
            DecorationKind::Marker => "node-marker",
        }
    }

    /// Pointer bindings of a decoration of this kind on node `id`.
    ///
    /// The expander toggles on click; severity badges behave like the header;
    /// flags and markers are display-only.
    pub fn bindings(self, id: &NodeId) -> Bindings {
        match self {
            DecorationKind::Expander => Bindings {
                click: Some(NodeCommand::ToggleExpand(id.clone())),
                double_click: None,
            },
            DecorationKind::Severity | DecorationKind::SeverityText => Bindings::for_header(id),
            DecorationKind::Flag | DecorationKind::Marker => Bindings::default(),
        }
    }
}

/// Alert severity levels shown as badges.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Errors, shown first.
    Error,
    /// Warnings.
    Warn,
}

impl Severity {
    /// Both levels, in badge order.
    pub const ALL: [Severity; 2] = [Severity::Error, Severity::Warn];

    /// Field name in the source `data.severity` object.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
        }
    }

    /// Badge fill color.
    pub fn fill(self) -> &'static str {
        match self {
            Severity::Error => "#EB3E3E",
            Severity::Warn => "#FFA630",
        }
    }
}

/// Logical key of a decoration within its node.
///
/// The reconciler keys decoration sub-diffs by this value, so it must be
/// stable across refreshes for "the same" decoration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DecorationKey {
    /// Decoration kind.
    pub kind: DecorationKind,
    /// Header name within the kind, e.g. `error` or a flag name.
    pub name: String,
}

impl DecorationKey {
    /// Create a key.
    pub fn new(kind: DecorationKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for DecorationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.class_name(), self.name)
    }
}

/// Command a rendered element triggers, addressed by node id.
///
/// Elements never hold a pointer back to the controller; they carry the
/// command and the host dispatches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeCommand {
    /// Toggle selection of the node.
    Select(NodeId),
    /// Toggle expansion of the node.
    ToggleExpand(NodeId),
}

impl NodeCommand {
    /// The node the command addresses.
    pub fn node_id(&self) -> &NodeId {
        match self {
            NodeCommand::Select(id) | NodeCommand::ToggleExpand(id) => id,
        }
    }
}

/// Pointer bindings of a rendered element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Bindings {
    /// Command for a single click.
    pub click: Option<NodeCommand>,
    /// Command for a double click.
    pub double_click: Option<NodeCommand>,
}

impl Bindings {
    /// Bindings of a node header: click selects, double click toggles.
    pub fn for_header(id: &NodeId) -> Self {
        Self {
            click: Some(NodeCommand::Select(id.clone())),
            double_click: Some(NodeCommand::ToggleExpand(id.clone())),
        }
    }
}

/// A computed decoration with local (node-relative) geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decoration {
    /// Logical key.
    pub key: DecorationKey,
    /// Node-relative bounds.
    pub rect: Rect,
    /// Fill color, if any.
    pub fill: Option<String>,
    /// Text content, if any.
    pub text: Option<String>,
    /// Image reference, if any.
    pub image: Option<String>,
}

impl Decoration {
    /// Pointer bindings for this decoration on node `id`.
    pub fn bindings(&self, id: &NodeId) -> Bindings {
        self.key.kind.bindings(id)
    }
}

/// Decoration lists of one node, one per kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decorations {
    expander: Vec<Decoration>,
    severity: Vec<Decoration>,
    severity_text: Vec<Decoration>,
    flags: Vec<Decoration>,
    markers: Vec<Decoration>,
}

impl Decorations {
    /// Decorations of one kind.
    pub fn of(&self, kind: DecorationKind) -> &[Decoration] {
        match kind {
            DecorationKind::Expander => &self.expander,
            DecorationKind::Severity => &self.severity,
            DecorationKind::SeverityText => &self.severity_text,
            DecorationKind::Flag => &self.flags,
            DecorationKind::Marker => &self.markers,
        }
    }

    pub(crate) fn of_mut(&mut self, kind: DecorationKind) -> &mut Vec<Decoration> {
        match kind {
            DecorationKind::Expander => &mut self.expander,
            DecorationKind::Severity => &mut self.severity,
            DecorationKind::SeverityText => &mut self.severity_text,
            DecorationKind::Flag => &mut self.flags,
            DecorationKind::Marker => &mut self.markers,
        }
    }

    /// All decorations, kinds in render order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Decoration> {
        DecorationKind::ALL
            .into_iter()
            .flat_map(move |kind| self.of(kind).iter())
    }

    /// Remove every decoration.
    pub fn clear(&mut self) {
        for kind in DecorationKind::ALL {
            self.of_mut(kind).clear();
        }
    }

    /// Total number of decorations.
    pub fn len(&self) -> usize {
        DecorationKind::ALL
            .into_iter()
            .map(|kind| self.of(kind).len())
            .sum()
    }

    /// Whether there are no decorations at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Header elements of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderSlot {
    /// Kind icon.
    Logo,
    /// Kind label.
    TitleKind,
    /// Name label.
    TitleName,
}

impl HeaderSlot {
    /// Every slot, left to right.
    pub const ALL: [HeaderSlot; 3] = [HeaderSlot::Logo, HeaderSlot::TitleKind, HeaderSlot::TitleName];
}

/// A computed header element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    /// Slot the header occupies.
    pub slot: HeaderSlot,
    /// Node-relative bounds.
    pub rect: Rect,
    /// Label text for text slots.
    pub text: Option<String>,
}
