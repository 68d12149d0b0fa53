//! Binding between a [`ViewController`] and the shared store.
//!
//! [`DiagramView`] subscribes to the selection and marker keys and forwards
//! their notifications to the controller. Operations that produce
//! [`Effect`]s apply them here, after the controller borrow is released, so
//! the store's synchronous notifications can borrow the controller again.
//!
//! # Errors inside notifications
//!
//! Store callbacks cannot return errors. A [`ViewError`] raised while handling
//! a notification is logged and parked; the next fallible call on the view
//! returns it.

use super::input::PointerEvent;
use super::view_controller::{Effect, ViewController, ViewOptions};
use crate::layout::NodeCommand;
use crate::model::{MarkerMap, NodeId, Point, SourceNode, ViewError};
use crate::scene::{ReconcileStats, RenderBackend, UpdateMode};
use crate::store::{
    AutoPanToSelected, ExpandedNodes, Markers, SelectedNode, SetOptions, SharedState,
    SubscriptionId,
};
use crate::view_state::{Scheduler, TimerId};
use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};
use tracing::{error, warn};

type PendingError = Rc<RefCell<Option<ViewError>>>;

/// A diagram view wired to a shared store.
pub struct DiagramView<B: RenderBackend> {
    controller: Rc<RefCell<ViewController<B>>>,
    store: Rc<SharedState>,
    subscriptions: Vec<SubscriptionId>,
    pending_error: PendingError,
}

impl<B: RenderBackend + 'static> DiagramView<B> {
    /// Create the controller and subscribe it to the store.
    ///
    /// Subscriptions fire immediately, so the controller starts with the
    /// store's current selection and markers.
    pub fn new(
        backend: B,
        store: Rc<SharedState>,
        scheduler: Rc<dyn Scheduler>,
        options: ViewOptions,
    ) -> Self {
        let controller = Rc::new(RefCell::new(ViewController::new(
            backend,
            Rc::clone(&store),
            scheduler,
            options,
        )));
        let pending_error: PendingError = Rc::default();

        let selection = store.subscribe::<SelectedNode, _>(notify(
            &controller,
            &pending_error,
            |controller, selected: &Option<NodeId>| controller.on_selection_changed(selected.clone()),
        ));
        let markers = store.subscribe::<Markers, _>(notify(
            &controller,
            &pending_error,
            |controller, markers: &MarkerMap| controller.on_markers_changed(markers.clone()),
        ));

        Self {
            controller,
            store,
            subscriptions: vec![selection, markers],
            pending_error,
        }
    }

    /// Borrow the controller.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a store notification handled by this
    /// view.
    pub fn controller(&self) -> Ref<'_, ViewController<B>> {
        self.controller.borrow()
    }

    /// The store this view is bound to.
    pub fn store(&self) -> &Rc<SharedState> {
        &self.store
    }

    /// Create rendering fixtures and measure the surface.
    pub fn setup(&self) -> Result<(), ViewError> {
        self.controller.borrow_mut().setup()?;
        self.take_pending()
    }

    /// Re-measure the surface.
    pub fn on_resize(&self) -> Result<(), ViewError> {
        self.controller.borrow_mut().on_resize()?;
        self.take_pending()
    }

    /// Build a new layout tree from `source` and render it.
    pub fn accept_source_data(&self, source: &SourceNode) -> Result<ReconcileStats, ViewError> {
        let stats = self.controller.borrow_mut().accept_source_data(source)?;
        self.take_pending()?;
        Ok(stats)
    }

    /// Re-run the layout and reconcile the scene.
    pub fn update_all(&self, mode: UpdateMode) -> Result<ReconcileStats, ViewError> {
        let stats = self.controller.borrow_mut().update_all(mode)?;
        self.take_pending()?;
        Ok(stats)
    }

    /// Programmatic pan; leaves the auto-pan flag alone.
    pub fn pan_to(&self, target: Point, immediate: bool) -> Result<Point, ViewError> {
        let target = self.controller.borrow_mut().pan_to(target, immediate)?;
        self.take_pending()?;
        Ok(target)
    }

    /// Pan on behalf of a user gesture; turns auto-pan off.
    pub fn user_pan_to(&self, target: Point, immediate: bool) -> Result<(), ViewError> {
        let effects = self
            .controller
            .borrow_mut()
            .user_pan_to(target, immediate)?;
        self.apply(effects)
    }

    /// Advance the pan animation for a fired timer. Returns whether the view
    /// moved.
    pub fn on_timer(&self, id: TimerId) -> Result<bool, ViewError> {
        let moved = self.controller.borrow_mut().on_timer(id)?;
        self.take_pending()?;
        Ok(moved)
    }

    /// Handle a pointer gesture and apply its store writes.
    pub fn handle_pointer(&self, event: PointerEvent) -> Result<(), ViewError> {
        let effects = self.controller.borrow_mut().handle_pointer(event)?;
        self.apply(effects)
    }

    /// Run a node command as if its element was activated.
    pub fn dispatch(&self, command: &NodeCommand) -> Result<(), ViewError> {
        let effects = self.controller.borrow().dispatch(command);
        self.apply(effects)
    }

    /// Turn auto-pan on and centre the current selection.
    pub fn enable_auto_pan(&self) -> Result<(), ViewError> {
        self.store
            .set::<AutoPanToSelected>(true, SetOptions::default());
        self.controller.borrow_mut().activate_panning()?;
        self.take_pending()
    }

    fn apply(&self, effects: Vec<Effect>) -> Result<(), ViewError> {
        for effect in effects {
            match effect {
                Effect::Select(selected) => {
                    self.store
                        .set::<SelectedNode>(selected, SetOptions::default());
                }
                Effect::SetAutoPan(enabled) => {
                    self.store
                        .set::<AutoPanToSelected>(enabled, SetOptions::default());
                }
                Effect::PersistExpanded(id, expanded) => {
                    let mut map = self.store.get::<ExpandedNodes>();
                    map.insert(id, expanded);
                    self.store.set::<ExpandedNodes>(map, SetOptions::force());
                    self.controller
                        .borrow_mut()
                        .update_all(UpdateMode::Full)?;
                }
            }
            self.take_pending()?;
        }
        self.take_pending()
    }

    fn take_pending(&self) -> Result<(), ViewError> {
        match self.pending_error.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<B: RenderBackend> Drop for DiagramView<B> {
    fn drop(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.store.unsubscribe(id);
        }
    }
}

/// Adapt a controller method into a store callback.
///
/// The callback holds the controller weakly. A notification that arrives
/// while the controller is already borrowed is dropped with a warning; the
/// bridge never triggers one itself.
fn notify<B, V, F>(
    controller: &Rc<RefCell<ViewController<B>>>,
    pending: &PendingError,
    handler: F,
) -> impl Fn(&V) + 'static
where
    B: RenderBackend + 'static,
    V: ?Sized + 'static,
    F: Fn(&mut ViewController<B>, &V) -> Result<(), ViewError> + 'static,
{
    let controller: Weak<RefCell<ViewController<B>>> = Rc::downgrade(controller);
    let pending = Rc::clone(pending);
    move |value: &V| {
        let Some(cell) = controller.upgrade() else {
            return;
        };
        let Ok(mut controller) = cell.try_borrow_mut() else {
            warn!("store notification while the view is busy, dropped");
            return;
        };
        if let Err(err) = handler(&mut controller, value) {
            error!(%err, "store notification failed");
            pending.borrow_mut().get_or_insert(err);
        }
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
