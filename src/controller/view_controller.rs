//! View controller: owns the camera, minimap, reconciler and layout tree.
//!
//! Every mutation of the rendered view goes through this type. It reads the
//! shared store (expansion map, auto-pan flag) but never writes it: operations
//! that must change shared state return [`Effect`]s for the caller to apply
//! once it has released its borrow of the controller. Store notifications can
//! then re-enter the controller synchronously.

use super::input::{hit_test, hover_label, PointerEvent};
use crate::layout::{
    DepthExpandPolicy, ExpandPolicy, FontSpec, LayoutContext, LayoutParams, LayoutTree,
    NodeCommand,
};
use crate::model::{MarkerMap, NodeId, Point, Size, SourceNode, ViewError};
use crate::scene::{OverlayHandles, ReconcileStats, Reconciler, RenderBackend, UpdateMode};
use crate::store::{AutoPanToSelected, ExpandedNodes, SharedState};
use crate::view_state::{Camera, CameraConfig, MinimapConfig, MinimapFrame, Scheduler, TimerId};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

/// Store write requested by a controller operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Publish a new selection.
    Select(Option<NodeId>),
    /// Publish the auto-pan flag.
    SetAutoPan(bool),
    /// Persist the expansion state of a node and re-run a full update.
    PersistExpanded(NodeId, bool),
}

/// Construction-time tuning of a [`ViewController`].
pub struct ViewOptions {
    /// Header font; `None` makes every layout pass fail with
    /// [`ViewError::Config`].
    pub font: Option<FontSpec>,
    /// Arrangement geometry.
    pub params: LayoutParams,
    /// Camera tuning.
    pub camera: CameraConfig,
    /// Minimap tuning.
    pub minimap: MinimapConfig,
    /// Length of attribute transitions.
    pub transition: Duration,
    /// Initial expansion of nodes without persisted state.
    pub policy: Box<dyn ExpandPolicy>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            font: Some(FontSpec::default()),
            params: LayoutParams::default(),
            camera: CameraConfig::default(),
            minimap: MinimapConfig::default(),
            transition: crate::scene::DEFAULT_TRANSITION,
            policy: Box::new(DepthExpandPolicy::default()),
        }
    }
}

impl fmt::Debug for ViewOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewOptions")
            .field("font", &self.font.is_some())
            .field("params", &self.params)
            .field("camera", &self.camera)
            .field("minimap", &self.minimap)
            .field("transition", &self.transition)
            .finish_non_exhaustive()
    }
}

/// Controller of one diagram view.
pub struct ViewController<B: RenderBackend> {
    options: ViewOptions,
    backend: B,
    scheduler: Rc<dyn Scheduler>,
    store: Rc<SharedState>,
    camera: Camera,
    overlay: Option<OverlayHandles>,
    minimap: Option<MinimapFrame>,
    reconciler: Reconciler,
    tree: Option<LayoutTree>,
    markers: MarkerMap,
    selected: Option<NodeId>,
}

impl<B: RenderBackend> ViewController<B> {
    /// Create a controller. Nothing is rendered until [`setup`](Self::setup).
    pub fn new(
        backend: B,
        store: Rc<SharedState>,
        scheduler: Rc<dyn Scheduler>,
        options: ViewOptions,
    ) -> Self {
        Self {
            camera: Camera::new(options.camera),
            reconciler: Reconciler::new(options.transition),
            options,
            backend,
            scheduler,
            store,
            overlay: None,
            minimap: None,
            tree: None,
            markers: MarkerMap::new(),
            selected: None,
        }
    }

    // === Accessors ===

    /// Camera state.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Last computed minimap frame.
    pub fn minimap(&self) -> Option<&MinimapFrame> {
        self.minimap.as_ref()
    }

    /// Current layout tree, once source data was accepted.
    pub fn tree(&self) -> Option<&LayoutTree> {
        self.tree.as_ref()
    }

    /// Name of the flag or marker under a surface point, if any. The minimap
    /// covers the diagram, so points inside it have no label.
    pub fn hover_label(&self, point: Point) -> Option<String> {
        if self.minimap.is_some_and(|frame| frame.contains(point)) {
            return None;
        }
        hover_label(self.tree.as_ref()?, self.camera.view_pos(), point)
    }

    /// Rendering backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Reconciler and its registry.
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Selection as last delivered by the store.
    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// Marker overlay as last delivered by the store.
    pub fn markers(&self) -> &MarkerMap {
        &self.markers
    }

    /// Whether [`setup`](Self::setup) has run.
    pub fn is_set_up(&self) -> bool {
        self.overlay.is_some()
    }

    // === Lifecycle ===

    /// Create the minimap fixtures and measure the surface.
    pub fn setup(&mut self) -> Result<(), ViewError> {
        self.overlay = Some(self.backend.create_overlay());
        self.on_resize()
    }

    /// Re-measure the surface after a resize notification.
    pub fn on_resize(&mut self) -> Result<(), ViewError> {
        let size = self.backend.surface_size();
        self.resize_to(size)
    }

    /// Resize the viewport to `size`: re-clamp the pan and recompute the
    /// minimap.
    pub fn resize_to(&mut self, size: Size) -> Result<(), ViewError> {
        self.camera.resize(size);
        self.apply_pan_transform();
        self.setup_control()
    }

    /// Replace the layout tree with one built from `source` and render it.
    ///
    /// # Errors
    ///
    /// - [`ViewError::Config`] when no font is configured
    /// - [`ViewError::MissingElement`] when [`setup`](Self::setup) was skipped
    pub fn accept_source_data(&mut self, source: &SourceNode) -> Result<ReconcileStats, ViewError> {
        let expanded = self.store.get::<ExpandedNodes>();
        let ctx = LayoutContext {
            params: &self.options.params,
            font: self.options.font.as_ref(),
            policy: self.options.policy.as_ref(),
            expanded: &expanded,
            markers: &self.markers,
        };
        let mut tree = LayoutTree::from_source(source, &ctx)?;
        tree.set_selected(self.selected.clone());
        info!(
            root = %source.id,
            nodes = tree.len(),
            visible = tree.flattened().count(),
            "source data accepted"
        );
        self.tree = Some(tree);
        self.render(UpdateMode::Full)
    }

    /// Re-run the layout passes on the current tree and reconcile the scene.
    ///
    /// The expansion map is re-read from the store on every call. Without a
    /// tree this is a no-op.
    pub fn update_all(&mut self, mode: UpdateMode) -> Result<ReconcileStats, ViewError> {
        let Some(tree) = self.tree.as_mut() else {
            return Ok(ReconcileStats::default());
        };
        let expanded = self.store.get::<ExpandedNodes>();
        let ctx = LayoutContext {
            params: &self.options.params,
            font: self.options.font.as_ref(),
            policy: self.options.policy.as_ref(),
            expanded: &expanded,
            markers: &self.markers,
        };
        tree.refresh(&ctx)?;
        self.render(mode)
    }

    fn render(&mut self, mode: UpdateMode) -> Result<ReconcileStats, ViewError> {
        let content = self.tree.as_ref().map(LayoutTree::content_size);
        self.camera.set_content(content);
        self.apply_pan_transform();
        self.setup_control()?;

        let stats = match &self.tree {
            Some(tree) => self.reconciler.sync(tree, mode, &mut self.backend),
            None => ReconcileStats::default(),
        };

        self.setup_control()?;
        self.activate_panning()?;
        Ok(stats)
    }

    // === Store notifications ===

    /// Apply a selection published by the store.
    ///
    /// Only the previously and newly selected nodes are refreshed; then the
    /// camera follows the selection if auto-pan is on.
    pub fn on_selection_changed(&mut self, selected: Option<NodeId>) -> Result<(), ViewError> {
        let previous = std::mem::replace(&mut self.selected, selected.clone());
        if let Some(tree) = self.tree.as_mut() {
            tree.set_selected(selected.clone());
            let stats = self.reconciler.update_nodes(
                tree,
                previous.iter().chain(selected.iter()),
                &mut self.backend,
            );
            debug!(?previous, ?selected, ?stats, "selection applied");
        }
        self.activate_panning()
    }

    /// Replace the marker overlay and run a full update.
    pub fn on_markers_changed(&mut self, markers: MarkerMap) -> Result<(), ViewError> {
        self.markers = markers;
        self.update_all(UpdateMode::Full).map(|_| ())
    }

    // === Camera ===

    /// Programmatic pan. Returns the clamped target.
    ///
    /// Does not touch the auto-pan flag; see
    /// [`user_pan_to`](Self::user_pan_to).
    pub fn pan_to(&mut self, target: Point, immediate: bool) -> Result<Point, ViewError> {
        let target = self.camera.pan_to(target, immediate, self.scheduler.as_ref());
        self.apply_pan_transform();
        self.setup_control()?;
        Ok(target)
    }

    /// Pan on behalf of a user gesture, which turns auto-pan off.
    pub fn user_pan_to(&mut self, target: Point, immediate: bool) -> Result<Vec<Effect>, ViewError> {
        self.pan_to(target, immediate)?;
        Ok(vec![Effect::SetAutoPan(false)])
    }

    /// Advance the pan animation for a fired timer.
    ///
    /// Returns whether the view moved.
    pub fn on_timer(&mut self, id: TimerId) -> Result<bool, ViewError> {
        if !self.camera.on_timer(id, self.scheduler.as_ref()) {
            return Ok(false);
        }
        self.apply_pan_transform();
        self.setup_control()?;
        Ok(true)
    }

    /// Centre the selected node if auto-pan is on.
    ///
    /// Hidden and unknown selections are left alone.
    pub fn activate_panning(&mut self) -> Result<(), ViewError> {
        if !self.store.get::<AutoPanToSelected>() {
            return Ok(());
        }
        let Some(tree) = &self.tree else {
            return Ok(());
        };
        let Some(node) = self
            .selected
            .as_ref()
            .filter(|id| tree.is_visible(id))
            .and_then(|id| tree.get(id))
        else {
            return Ok(());
        };
        let target = self.camera.focus_target(node.abs_rect());
        self.pan_to(target, false).map(|_| ())
    }

    fn apply_pan_transform(&mut self) {
        self.backend.set_root_transform(self.camera.root_transform());
    }

    fn setup_control(&mut self) -> Result<(), ViewError> {
        let Some(tree) = &self.tree else {
            return Ok(());
        };
        let Some(overlay) = &self.overlay else {
            return Err(ViewError::MissingElement("minimap overlay"));
        };
        let frame = MinimapFrame::compute(
            self.camera.size(),
            tree.content_size(),
            self.camera.view_pos(),
            &self.options.minimap,
        );
        self.backend.set_minimap_frame(overlay, &frame);
        self.minimap = Some(frame);
        Ok(())
    }

    // === Input ===

    /// Route a pointer gesture to the minimap or the main surface.
    ///
    /// # Behavior
    /// - Drag on the surface pans by `-delta`; drag starting in the minimap
    ///   pans by `delta / scale`. Both are immediate.
    /// - Wheel pans by `+delta`, immediately.
    /// - Click in the minimap centres the clicked world point, animated.
    /// - Click and double click on a node dispatch its bindings.
    ///
    /// Every pan here is a user pan and turns auto-pan off.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<Vec<Effect>, ViewError> {
        let view_pos = self.camera.view_pos();
        let in_minimap = |point: Point| self.minimap.filter(|frame| frame.contains(point));

        match event {
            PointerEvent::Drag { start, dx, dy } => match in_minimap(start) {
                Some(frame) => {
                    let delta = frame.drag_delta(dx, dy);
                    self.user_pan_to(view_pos.offset(delta.x, delta.y), true)
                }
                None => self.user_pan_to(view_pos.offset(-dx, -dy), true),
            },
            PointerEvent::Wheel { dx, dy } => self.user_pan_to(view_pos.offset(dx, dy), true),
            PointerEvent::Click(point) => match in_minimap(point) {
                Some(frame) => {
                    let target = frame.click_target(point, self.camera.size());
                    self.user_pan_to(target, false)
                }
                None => self.dispatch_at(point, |bindings| bindings.click),
            },
            PointerEvent::DoubleClick(point) => match in_minimap(point) {
                Some(_) => Ok(Vec::new()),
                None => self.dispatch_at(point, |bindings| bindings.double_click),
            },
        }
    }

    fn dispatch_at(
        &mut self,
        point: Point,
        pick: impl FnOnce(crate::layout::Bindings) -> Option<NodeCommand>,
    ) -> Result<Vec<Effect>, ViewError> {
        let Some(tree) = &self.tree else {
            return Ok(Vec::new());
        };
        let hit = hit_test(tree, self.camera.view_pos(), point);
        match pick(hit.bindings()) {
            Some(command) => Ok(self.dispatch(&command)),
            None => Ok(Vec::new()),
        }
    }

    /// Translate a node command into store writes.
    ///
    /// - `Select` turns auto-pan off and toggles the selection: selecting the
    ///   selected node clears it.
    /// - `ToggleExpand` persists the inverted expansion state. Unknown ids
    ///   produce nothing.
    pub fn dispatch(&self, command: &NodeCommand) -> Vec<Effect> {
        match command {
            NodeCommand::Select(id) => {
                let next = if self.selected.as_ref() == Some(id) {
                    None
                } else {
                    Some(id.clone())
                };
                vec![Effect::SetAutoPan(false), Effect::Select(next)]
            }
            NodeCommand::ToggleExpand(id) => self
                .tree
                .as_ref()
                .and_then(|tree| tree.get(id))
                .map(|node| vec![Effect::PersistExpanded(id.clone(), !node.is_expanded())])
                .unwrap_or_default(),
        }
    }
}

impl<B: RenderBackend + fmt::Debug> fmt::Debug for ViewController<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewController")
            .field("options", &self.options)
            .field("backend", &self.backend)
            .field("camera", &self.camera)
            .field("minimap", &self.minimap)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "view_controller_tests.rs"]
mod tests;
