//! Rendering backend interface.
//!
//! The reconciler never draws anything. It creates, updates and destroys
//! opaque element handles through [`RenderBackend`], passing plain attribute
//! structs. A backend may be a retained scene graph, a terminal rasteriser
//! or a recorder for tests.

use crate::layout::{Bindings, Decoration, Header, HeaderSlot, LayoutNode, NodePalette};
use crate::model::{NodeId, Point, Rect, Size};
use crate::view_state::MinimapFrame;
use serde::Serialize;
use std::time::Duration;

/// Opaque handle of a backend element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementHandle(u64);

impl ElementHandle {
    /// Wrap a backend-assigned raw id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Render layer of a node element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layer {
    /// Full-size diagram, translated by the camera.
    Main,
    /// Scaled overview.
    Minimap,
}

/// How attribute changes are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transition {
    /// Apply at once.
    Immediate,
    /// Animate over the given time.
    Timed(Duration),
}

/// Attributes of a main-layer node element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeAttrs {
    /// Absolute world bounds.
    pub rect: Rect,
    /// Header band height.
    pub header_height: f64,
    /// Width of the header highlight strip: full width when selected, a
    /// square of the header height otherwise.
    pub header_highlight_width: f64,
    /// Selection state.
    pub selected: bool,
    /// Colors.
    pub palette: NodePalette,
    /// Kind icon reference, if the node has a logo slot.
    pub logo: Option<String>,
    /// Header elements (logo, kind and name labels).
    pub headers: Vec<Header>,
}

impl NodeAttrs {
    /// Attributes of `node` with the given selection state.
    pub fn for_node(node: &LayoutNode, selected: bool) -> Self {
        let header_highlight_width = if selected {
            node.width()
        } else {
            node.header_height()
        };
        Self {
            rect: node.abs_rect(),
            header_height: node.header_height(),
            header_highlight_width,
            selected,
            palette: node.palette().clone(),
            logo: node
                .header(HeaderSlot::Logo)
                .map(|_| format!("kind:{}", node.kind())),
            headers: HeaderSlot::ALL
                .into_iter()
                .filter_map(|slot| node.header(slot).cloned())
                .collect(),
        }
    }
}

/// Attributes of a minimap node element: background and size only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinimapNodeAttrs {
    /// Absolute world bounds; the minimap layer applies its own scale.
    pub rect: Rect,
    /// Body background.
    pub bg_fill: String,
    /// Header band height.
    pub header_height: f64,
    /// Header highlight width, as on the main layer.
    pub header_highlight_width: f64,
    /// Header highlight color.
    pub header_fill: String,
}

impl MinimapNodeAttrs {
    /// Reduced attributes of `node`.
    pub fn for_node(node: &LayoutNode, selected: bool) -> Self {
        let full = NodeAttrs::for_node(node, selected);
        Self {
            rect: full.rect,
            bg_fill: full.palette.bg_fill,
            header_height: full.header_height,
            header_highlight_width: full.header_highlight_width,
            header_fill: full.palette.header_fill,
        }
    }
}

/// Fixed elements of the minimap overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverlayHandles {
    /// Group positioned at the box origin.
    pub group: ElementHandle,
    /// Backing rectangle of the box.
    pub full_rect: ElementHandle,
    /// Scaled group holding minimap node elements.
    pub items_group: ElementHandle,
    /// Visible-region indicator.
    pub visible_rect: ElementHandle,
}

/// Surface the reconciler and controller render into.
pub trait RenderBackend {
    /// Current size of the rendering surface.
    fn surface_size(&self) -> Size;

    /// Create the minimap overlay fixtures.
    fn create_overlay(&mut self) -> OverlayHandles;

    /// Translate the main layer's root element.
    fn set_root_transform(&mut self, offset: Point);

    /// Position and scale the minimap overlay.
    fn set_minimap_frame(&mut self, overlay: &OverlayHandles, frame: &MinimapFrame);

    /// Create an empty node element for `id` on `layer`.
    fn create_element(&mut self, layer: Layer, id: &NodeId, bindings: &Bindings) -> ElementHandle;

    /// Remove a node element and everything attached to it.
    fn destroy_element(&mut self, handle: ElementHandle);

    /// Apply main-layer attributes.
    fn update_node(&mut self, handle: ElementHandle, attrs: &NodeAttrs, transition: Transition);

    /// Apply minimap attributes.
    fn update_minimap_node(
        &mut self,
        handle: ElementHandle,
        attrs: &MinimapNodeAttrs,
        transition: Transition,
    );

    /// Create a decoration element under `parent`.
    fn create_decoration(
        &mut self,
        parent: ElementHandle,
        decoration: &Decoration,
        bindings: &Bindings,
    ) -> ElementHandle;

    /// Apply decoration attributes.
    fn update_decoration(
        &mut self,
        handle: ElementHandle,
        decoration: &Decoration,
        transition: Transition,
    );

    /// Remove a decoration element.
    fn destroy_decoration(&mut self, handle: ElementHandle);
}
