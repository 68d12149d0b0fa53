//! Default box-packing arrangement.
//!
//! Each node is a box with a header band on top. The header holds the kind
//! logo, the kind and name labels, then the trailing decorations (severity
//! badges, flags, markers) and a right-aligned expander. Children of an
//! expanded node are packed left-to-right in rows below the header, wrapping
//! once a row would grow past `max_row_width`.

use super::decoration::{Decoration, DecorationKey, DecorationKind, Header, HeaderSlot};
use super::metrics::{measure_text, FontSpec};
use super::node::{LayoutNode, NodePalette};
use crate::model::{MarkerMap, Point, Rect, ViewError};
use serde::{Deserialize, Serialize};

/// Geometry parameters of the default arrangement, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    /// Gap around and between child boxes.
    pub padding: f64,
    /// Gap around and between header elements.
    pub header_padding: f64,
    /// Side of the square kind logo and expander.
    pub logo_size: f64,
    /// Row width at which children wrap to the next row.
    pub max_row_width: f64,
    /// Minimum width of a severity badge.
    pub badge_min_width: f64,
    /// Side of a square flag icon.
    pub flag_size: f64,
    /// Side of a square marker box.
    pub marker_size: f64,
    /// Whether the root node is part of the rendered sequence.
    pub show_root: bool,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            padding: 10.0,
            header_padding: 5.0,
            logo_size: 20.0,
            max_row_width: 1200.0,
            badge_min_width: 24.0,
            flag_size: 20.0,
            marker_size: 20.0,
            show_root: true,
        }
    }
}

/// Fill colors cycled by depth.
const DEPTH_FILLS: [(&str, &str); 4] = [
    ("#1F2027", "#4F5260"),
    ("#292A2F", "#5C6070"),
    ("#35373E", "#6A6F80"),
    ("#41434B", "#787E90"),
];

const STROKE: &str = "rgb(53, 55, 62)";
const HEADER_FILL: &str = "#3D7FEA";

pub(crate) fn palette_for_depth(depth: usize) -> NodePalette {
    let (bg, header_bg) = DEPTH_FILLS[depth % DEPTH_FILLS.len()];
    NodePalette {
        bg_fill: bg.to_string(),
        stroke: STROKE.to_string(),
        header_bg_fill: header_bg.to_string(),
        header_fill: HEADER_FILL.to_string(),
    }
}

/// Lay out the header of `node` and return the width it occupies.
///
/// Rebuilds headers and decorations from scratch; markers are looked up by
/// node id in `markers`.
pub(crate) fn measure_header(
    node: &mut LayoutNode,
    params: &LayoutParams,
    font: Option<&FontSpec>,
    markers: &MarkerMap,
) -> Result<f64, ViewError> {
    let font = font.ok_or(ViewError::Config("font spec"))?;
    let pad = params.header_padding;
    let inner = font.height.max(params.logo_size);
    let header_height = inner + 2.0 * pad;
    let text_y = pad + (inner - font.height) / 2.0;
    let icon_y = |side: f64| pad + (inner - side) / 2.0;

    node.headers.clear();
    node.decorations.clear();
    node.header_height = header_height;
    node.palette = palette_for_depth(node.depth);

    let mut x = pad;
    if !node.kind.is_empty() {
        node.headers.push(Header {
            slot: HeaderSlot::Logo,
            rect: Rect::new(x, icon_y(params.logo_size), params.logo_size, params.logo_size),
            text: None,
        });
        x += params.logo_size + pad;

        let kind = measure_text(Some(node.kind.as_str()), Some(font))?;
        node.headers.push(Header {
            slot: HeaderSlot::TitleKind,
            rect: Rect::new(x, text_y, kind.width, kind.height),
            text: Some(node.kind.clone()),
        });
        x += kind.width + pad;
    }

    let name = measure_text(Some(node.name.as_str()), Some(font))?;
    node.headers.push(Header {
        slot: HeaderSlot::TitleName,
        rect: Rect::new(x, text_y, name.width, name.height),
        text: Some(node.name.clone()),
    });
    x += name.width + pad;

    for (severity, count) in &node.severity {
        let text = measure_text(Some(count), Some(font))?;
        let badge_width = params.badge_min_width.max(text.width + 2.0 * pad);
        node.decorations
            .of_mut(DecorationKind::Severity)
            .push(Decoration {
                key: DecorationKey::new(DecorationKind::Severity, severity.as_str()),
                rect: Rect::new(x, pad, badge_width, inner),
                fill: Some(severity.fill().to_string()),
                text: None,
                image: None,
            });
        node.decorations
            .of_mut(DecorationKind::SeverityText)
            .push(Decoration {
                key: DecorationKey::new(DecorationKind::SeverityText, severity.as_str()),
                rect: Rect::new(
                    x + (badge_width - text.width) / 2.0,
                    text_y,
                    text.width,
                    text.height,
                ),
                fill: None,
                text: Some(count.to_string()),
                image: None,
            });
        x += badge_width + pad;
    }

    for flag in &node.flags {
        node.decorations.of_mut(DecorationKind::Flag).push(Decoration {
            key: DecorationKey::new(DecorationKind::Flag, flag.as_str()),
            rect: Rect::new(x, icon_y(params.flag_size), params.flag_size, params.flag_size),
            fill: None,
            text: None,
            image: Some(format!("flag:{flag}")),
        });
        x += params.flag_size + pad;
    }

    for marker in markers.get(&node.id).into_iter().flatten() {
        let placed = node.decorations.of(DecorationKind::Marker);
        if placed.iter().any(|d| d.key.name == marker.name) {
            continue;
        }
        node.decorations
            .of_mut(DecorationKind::Marker)
            .push(Decoration {
                key: DecorationKey::new(DecorationKind::Marker, marker.name.as_str()),
                rect: Rect::new(
                    x,
                    icon_y(params.marker_size),
                    params.marker_size,
                    params.marker_size,
                ),
                fill: Some(marker.color.clone()),
                text: Some(marker.glyph.clone()),
                image: None,
            });
        x += params.marker_size + pad;
    }

    if node.has_children() {
        // placed once the final width is known
        x += params.logo_size + pad;
    }

    Ok(x)
}

/// Place the children of `node` in rows and size the node.
///
/// `child_sizes` are the already-measured sizes of the node's visible
/// children, in order. Returns each child's offset from the node's origin.
pub(crate) fn pack_children(
    node: &mut LayoutNode,
    header_width: f64,
    child_sizes: &[(f64, f64)],
    params: &LayoutParams,
) -> Vec<Point> {
    let pad = params.padding;
    let mut offsets = Vec::with_capacity(child_sizes.len());
    let mut cursor = Point::new(pad, node.header_height + pad);
    let mut row_height: f64 = 0.0;
    let mut content_width: f64 = 0.0;

    for &(width, height) in child_sizes {
        if cursor.x > pad && cursor.x + width > params.max_row_width {
            cursor = Point::new(pad, cursor.y + row_height + pad);
            row_height = 0.0;
        }
        offsets.push(cursor);
        cursor.x += width + pad;
        row_height = row_height.max(height);
        content_width = content_width.max(cursor.x);
    }

    node.width = header_width.max(content_width);
    node.height = if offsets.is_empty() {
        node.header_height
    } else {
        cursor.y + row_height + pad
    };

    if node.has_children() {
        let side = params.logo_size;
        let image = if node.is_expanded {
            "expander:open"
        } else {
            "expander:closed"
        };
        node.decorations
            .of_mut(DecorationKind::Expander)
            .push(Decoration {
                key: DecorationKey::new(DecorationKind::Expander, "expander"),
                rect: Rect::new(
                    node.width - params.header_padding - side,
                    params.header_padding + (node.header_height - 2.0 * params.header_padding - side) / 2.0,
                    side,
                    side,
                ),
                fill: None,
                text: None,
                image: Some(image.to_string()),
            });
    }

    offsets
}
