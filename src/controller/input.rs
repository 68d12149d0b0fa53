//! Pointer input and hit-testing.
//!
//! Pure functions mapping surface coordinates to nodes. Routing between the
//! minimap and the main surface happens in the controller.

use crate::layout::{Bindings, Decoration, DecorationKind, LayoutNode, LayoutTree};
use crate::model::{NodeId, Point};

/// A pointer gesture in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Drag step of `(dx, dy)`; `start` is where the gesture began and
    /// decides whether it belongs to the minimap.
    Drag {
        /// Gesture origin.
        start: Point,
        /// Horizontal movement since the previous step.
        dx: f64,
        /// Vertical movement since the previous step.
        dy: f64,
    },
    /// Scroll wheel delta.
    Wheel {
        /// Horizontal delta.
        dx: f64,
        /// Vertical delta.
        dy: f64,
    },
    /// Single click.
    Click(Point),
    /// Double click.
    DoubleClick(Point),
}

/// Part of a node that was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Header band.
    Header,
    /// A decoration of the given kind.
    Decoration(DecorationKind),
    /// Body below the header.
    Body,
}

/// Result of hit-testing a surface coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTestResult {
    /// No visible node under the point.
    Miss,

    /// Point is inside a visible node.
    Hit {
        /// Innermost node under the point.
        id: NodeId,
        /// Part of the node under the point.
        target: HitTarget,
    },
}

impl HitTestResult {
    /// Check if this was a hit.
    pub fn is_hit(&self) -> bool {
        matches!(self, HitTestResult::Hit { .. })
    }

    /// Get node id if hit.
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            HitTestResult::Hit { id, .. } => Some(id),
            HitTestResult::Miss => None,
        }
    }

    /// Pointer bindings of the hit element.
    ///
    /// Header and body select on click and toggle on double click; decorations
    /// carry the bindings their kind is rendered with.
    pub fn bindings(&self) -> Bindings {
        match self {
            HitTestResult::Miss => Bindings::default(),
            HitTestResult::Hit { id, target } => match target {
                HitTarget::Header | HitTarget::Body => Bindings::for_header(id),
                HitTarget::Decoration(kind) => kind.bindings(id),
            },
        }
    }
}

/// Hit-test a surface point against the visible nodes.
///
/// # Arguments
/// * `tree` - Laid-out tree; only its flattened sequence is considered
/// * `view_pos` - Camera position; surface `(0, 0)` maps to this world point
/// * `point` - Surface coordinate
///
/// # Behavior
/// - Later nodes in the flattened sequence are drawn on top, so they are
///   tested first and the innermost node wins
/// - Decorations are tested before the header band
pub fn hit_test(tree: &LayoutTree, view_pos: Point, point: Point) -> HitTestResult {
    let world = point.offset(view_pos.x, view_pos.y);
    let Some(node) = topmost_at(tree, world) else {
        return HitTestResult::Miss;
    };

    let origin = node.abs_pos();
    let target = decoration_at(node, world)
        .map(|d| HitTarget::Decoration(d.key.kind))
        .unwrap_or(if world.y < origin.y + node.header_height() {
            HitTarget::Header
        } else {
            HitTarget::Body
        });

    HitTestResult::Hit {
        id: node.id().clone(),
        target,
    }
}

/// Hover text for a flag or marker under a surface point, e.g.
/// `"flag: maintenance"`. Other decorations and plain node areas have none.
pub fn hover_label(tree: &LayoutTree, view_pos: Point, point: Point) -> Option<String> {
    let world = point.offset(view_pos.x, view_pos.y);
    let decoration = decoration_at(topmost_at(tree, world)?, world)?;
    let prefix = match decoration.key.kind {
        DecorationKind::Flag => "flag",
        DecorationKind::Marker => "marker",
        _ => return None,
    };
    Some(format!("{prefix}: {}", decoration.key.name))
}

/// Later nodes in the flattened sequence are drawn on top.
fn topmost_at(tree: &LayoutTree, world: Point) -> Option<&LayoutNode> {
    let flat: Vec<_> = tree.flattened().collect();
    flat.into_iter().rev().find(|node| node.abs_rect().contains(world))
}

fn decoration_at(node: &LayoutNode, world: Point) -> Option<&Decoration> {
    let origin = node.abs_pos();
    node.decorations()
        .iter()
        .rev()
        .find(|d| d.rect.translate(origin).contains(world))
}
