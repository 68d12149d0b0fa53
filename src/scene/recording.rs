//! In-memory retained scene.
//!
//! [`RecordingBackend`] implements [`RenderBackend`] by keeping every element
//! and its last attributes in a [`Scene`]. The terminal front-end rasterises
//! that scene each frame, `--dump` prints it, and tests inspect it.
//!
//! The backend is a cheap handle around shared state: clone it, hand one
//! copy to the controller and keep the other to read the scene.

use super::backend::{
    ElementHandle, Layer, MinimapNodeAttrs, NodeAttrs, OverlayHandles, RenderBackend, Transition,
};
use crate::layout::{Bindings, Decoration};
use crate::model::{NodeId, Point, Size};
use crate::view_state::MinimapFrame;
use serde::Serialize;
use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::rc::Rc;

/// A recorded node element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneElement {
    /// Layer the element lives on.
    pub layer: Layer,
    /// Node the element renders.
    pub id: NodeId,
    /// Pointer bindings.
    pub bindings: Bindings,
    /// Main-layer attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attrs: Option<NodeAttrs>,
    /// Minimap attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimap_attrs: Option<MinimapNodeAttrs>,
    /// Transition of the last update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
}

/// A recorded decoration element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneDecoration {
    /// Owning node element.
    pub parent: ElementHandle,
    /// Last applied decoration.
    pub decoration: Decoration,
    /// Pointer bindings.
    pub bindings: Bindings,
}

/// Number of backend calls by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OpCounts {
    /// `create_element` calls.
    pub create: usize,
    /// `destroy_element` calls.
    pub destroy: usize,
    /// `update_node` and `update_minimap_node` calls.
    pub update: usize,
    /// `create_decoration` calls.
    pub decoration_create: usize,
    /// `update_decoration` calls.
    pub decoration_update: usize,
    /// `destroy_decoration` calls.
    pub decoration_destroy: usize,
}

impl OpCounts {
    /// Total element and decoration calls.
    pub fn total(&self) -> usize {
        self.create
            + self.destroy
            + self.update
            + self.decoration_create
            + self.decoration_update
            + self.decoration_destroy
    }
}

/// Retained scene state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    /// Surface size reported to the controller.
    pub surface: Size,
    /// Offset of the main layer's root.
    pub root_transform: Point,
    /// Minimap fixtures, once created.
    pub overlay: Option<OverlayHandles>,
    /// Last minimap placement.
    pub minimap: Option<MinimapFrame>,
    /// Node elements by handle (creation order).
    pub elements: BTreeMap<ElementHandle, SceneElement>,
    /// Decoration elements by handle (creation order).
    pub decorations: BTreeMap<ElementHandle, SceneDecoration>,
    /// Call counters.
    pub ops: OpCounts,
    #[serde(skip)]
    next_handle: u64,
}

impl Scene {
    fn allocate(&mut self) -> ElementHandle {
        self.next_handle += 1;
        ElementHandle::new(self.next_handle)
    }

    /// Elements of one layer, in creation order.
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = (&ElementHandle, &SceneElement)> {
        self.elements.iter().filter(move |(_, e)| e.layer == layer)
    }

    /// Element of `id` on `layer`.
    pub fn element(&self, layer: Layer, id: &NodeId) -> Option<(ElementHandle, &SceneElement)> {
        self.layer(layer)
            .find(|(_, e)| &e.id == id)
            .map(|(handle, e)| (*handle, e))
    }

    /// Decorations attached to `parent`, in creation order.
    pub fn decorations_of(&self, parent: ElementHandle) -> impl Iterator<Item = &SceneDecoration> {
        self.decorations
            .values()
            .filter(move |d| d.parent == parent)
    }

    /// Ids rendered on the main layer, in creation order.
    pub fn main_ids(&self) -> Vec<&NodeId> {
        self.layer(Layer::Main).map(|(_, e)| &e.id).collect()
    }

    /// Human-readable listing of the main layer.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "surface {}x{} view {},{}",
            self.surface.width, self.surface.height, -self.root_transform.x, -self.root_transform.y
        );
        for (handle, element) in self.layer(Layer::Main) {
            let Some(attrs) = &element.attrs else {
                continue;
            };
            let marker = if attrs.selected { "*" } else { " " };
            let _ = writeln!(
                out,
                "{marker} {} @ {},{} {}x{}",
                element.id, attrs.rect.x, attrs.rect.y, attrs.rect.width, attrs.rect.height
            );
            for deco in self.decorations_of(*handle) {
                let _ = writeln!(out, "    {}", deco.decoration.key);
            }
        }
        if let Some(frame) = &self.minimap {
            let _ = writeln!(
                out,
                "minimap @ {},{} {}x{} scale {}",
                frame.origin.x,
                frame.origin.y,
                frame.box_size.width,
                frame.box_size.height,
                frame.scale
            );
        }
        out
    }
}

/// [`RenderBackend`] recording into a shared [`Scene`].
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    scene: Rc<RefCell<Scene>>,
}

impl RecordingBackend {
    /// Backend with a surface of `size`.
    pub fn new(size: Size) -> Self {
        let backend = Self::default();
        backend.set_surface_size(size);
        backend
    }

    /// Change the reported surface size.
    pub fn set_surface_size(&self, size: Size) {
        self.scene.borrow_mut().surface = size;
    }

    /// Borrow the scene.
    pub fn scene(&self) -> Ref<'_, Scene> {
        self.scene.borrow()
    }

    /// Copy of the scene.
    pub fn snapshot(&self) -> Scene {
        self.scene.borrow().clone()
    }

    /// Reset the call counters.
    pub fn reset_ops(&self) {
        self.scene.borrow_mut().ops = OpCounts::default();
    }

    /// Scene as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&*self.scene.borrow())
    }
}

impl RenderBackend for RecordingBackend {
    fn surface_size(&self) -> Size {
        self.scene.borrow().surface
    }

    fn create_overlay(&mut self) -> OverlayHandles {
        let mut scene = self.scene.borrow_mut();
        let overlay = OverlayHandles {
            group: scene.allocate(),
            full_rect: scene.allocate(),
            items_group: scene.allocate(),
            visible_rect: scene.allocate(),
        };
        scene.overlay = Some(overlay);
        overlay
    }

    fn set_root_transform(&mut self, offset: Point) {
        self.scene.borrow_mut().root_transform = offset;
    }

    fn set_minimap_frame(&mut self, _overlay: &OverlayHandles, frame: &MinimapFrame) {
        self.scene.borrow_mut().minimap = Some(*frame);
    }

    fn create_element(&mut self, layer: Layer, id: &NodeId, bindings: &Bindings) -> ElementHandle {
        let mut scene = self.scene.borrow_mut();
        let handle = scene.allocate();
        scene.elements.insert(
            handle,
            SceneElement {
                layer,
                id: id.clone(),
                bindings: bindings.clone(),
                attrs: None,
                minimap_attrs: None,
                transition: None,
            },
        );
        scene.ops.create += 1;
        handle
    }

    fn destroy_element(&mut self, handle: ElementHandle) {
        let mut scene = self.scene.borrow_mut();
        scene.elements.remove(&handle);
        scene.decorations.retain(|_, d| d.parent != handle);
        scene.ops.destroy += 1;
    }

    fn update_node(&mut self, handle: ElementHandle, attrs: &NodeAttrs, transition: Transition) {
        let mut scene = self.scene.borrow_mut();
        if let Some(element) = scene.elements.get_mut(&handle) {
            element.attrs = Some(attrs.clone());
            element.transition = Some(transition);
        }
        scene.ops.update += 1;
    }

    fn update_minimap_node(
        &mut self,
        handle: ElementHandle,
        attrs: &MinimapNodeAttrs,
        transition: Transition,
    ) {
        let mut scene = self.scene.borrow_mut();
        if let Some(element) = scene.elements.get_mut(&handle) {
            element.minimap_attrs = Some(attrs.clone());
            element.transition = Some(transition);
        }
        scene.ops.update += 1;
    }

    fn create_decoration(
        &mut self,
        parent: ElementHandle,
        decoration: &Decoration,
        bindings: &Bindings,
    ) -> ElementHandle {
        let mut scene = self.scene.borrow_mut();
        let handle = scene.allocate();
        scene.decorations.insert(
            handle,
            SceneDecoration {
                parent,
                decoration: decoration.clone(),
                bindings: bindings.clone(),
            },
        );
        scene.ops.decoration_create += 1;
        handle
    }

    fn update_decoration(
        &mut self,
        handle: ElementHandle,
        decoration: &Decoration,
        _transition: Transition,
    ) {
        let mut scene = self.scene.borrow_mut();
        if let Some(recorded) = scene.decorations.get_mut(&handle) {
            recorded.decoration = decoration.clone();
        }
        scene.ops.decoration_update += 1;
    }

    fn destroy_decoration(&mut self, handle: ElementHandle) {
        let mut scene = self.scene.borrow_mut();
        scene.decorations.remove(&handle);
        scene.ops.decoration_destroy += 1;
    }
}
