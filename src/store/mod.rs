//! In-process shared-state store.
//!
//! A typed publish/subscribe key-value store. Keys are zero-sized marker
//! types implementing [`StateKey`], so every read and write is checked
//! against the key's value type at compile time.
//!
//! # Delivery
//!
//! Notifications are synchronous and run in subscription order. Callbacks are
//! collected before any of them runs, so a callback may `set` or `subscribe`
//! on the same store without deadlocking or invalidating iteration. Writes
//! performed from inside a callback are delivered before the outer `set`
//! returns.

use crate::model::{MarkerMap, NodeId};
use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// A typed store key.
pub trait StateKey: 'static {
    /// Key name, for logs.
    const NAME: &'static str;
    /// Value type stored under the key.
    type Value: Clone + PartialEq + fmt::Debug + 'static;
    /// Value before the first write.
    fn initial() -> Self::Value;
}

/// Id of the selected node, if any.
#[derive(Debug)]
pub struct SelectedNode;

impl StateKey for SelectedNode {
    const NAME: &'static str = "selected_dn";
    type Value = Option<NodeId>;

    fn initial() -> Self::Value {
        None
    }
}

/// Marker overlay, replaced wholesale on every publish.
#[derive(Debug)]
pub struct Markers;

impl StateKey for Markers {
    const NAME: &'static str = "markers_dict";
    type Value = MarkerMap;

    fn initial() -> Self::Value {
        MarkerMap::new()
    }
}

/// Persisted expansion state by node id.
#[derive(Debug)]
pub struct ExpandedNodes;

impl StateKey for ExpandedNodes {
    const NAME: &'static str = "diagram_expanded_dns";
    type Value = BTreeMap<NodeId, bool>;

    fn initial() -> Self::Value {
        BTreeMap::new()
    }
}

/// Whether the camera follows the selection.
#[derive(Debug)]
pub struct AutoPanToSelected;

impl StateKey for AutoPanToSelected {
    const NAME: &'static str = "auto_pan_to_selected_dn";
    type Value = bool;

    fn initial() -> Self::Value {
        false
    }
}

/// Options of a write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Notify subscribers even when the value did not change.
    pub force: bool,
}

impl SetOptions {
    /// Notify regardless of equality.
    pub fn force() -> Self {
        Self { force: true }
    }
}

/// Handle returned by [`SharedState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Rc<dyn Fn(&dyn Any)>;

struct Subscriber {
    id: SubscriptionId,
    key: TypeId,
    callback: Callback,
}

/// Single-threaded shared-state store.
///
/// Cheap to share as `Rc<SharedState>`; all methods take `&self`.
#[derive(Default)]
pub struct SharedState {
    values: RefCell<HashMap<TypeId, Rc<dyn Any>>>,
    subscribers: RefCell<Vec<Subscriber>>,
    next_id: Cell<u64>,
}

impl fmt::Debug for SharedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedState")
            .field("keys", &self.values.borrow().len())
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

impl SharedState {
    /// Empty store; every key reads as its initial value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `K`.
    pub fn get<K: StateKey>(&self) -> K::Value {
        self.values
            .borrow()
            .get(&TypeId::of::<K>())
            .and_then(|value| value.downcast_ref::<K::Value>())
            .cloned()
            .unwrap_or_else(K::initial)
    }

    /// Write `value` under `K` and notify subscribers.
    ///
    /// Writing a value equal to the current one is a no-op unless
    /// `options.force` is set. Returns whether subscribers were notified.
    pub fn set<K: StateKey>(&self, value: K::Value, options: SetOptions) -> bool {
        if !options.force && self.get::<K>() == value {
            return false;
        }
        trace!(key = K::NAME, ?value, force = options.force, "store set");

        let value: Rc<dyn Any> = Rc::new(value);
        self.values
            .borrow_mut()
            .insert(TypeId::of::<K>(), Rc::clone(&value));

        let callbacks: Vec<Callback> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|s| s.key == TypeId::of::<K>())
            .map(|s| Rc::clone(&s.callback))
            .collect();
        for callback in callbacks {
            callback(&*value);
        }
        true
    }

    /// Register `callback` for `K`.
    ///
    /// The callback fires immediately with the current value, then after
    /// every notifying [`set`](Self::set).
    pub fn subscribe<K, F>(&self, callback: F) -> SubscriptionId
    where
        K: StateKey,
        F: Fn(&K::Value) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let callback: Callback = Rc::new(move |value: &dyn Any| {
            if let Some(value) = value.downcast_ref::<K::Value>() {
                callback(value);
            }
        });
        self.subscribers.borrow_mut().push(Subscriber {
            id,
            key: TypeId::of::<K>(),
            callback: Rc::clone(&callback),
        });

        let current = self.get::<K>();
        callback(&current as &dyn Any);
        id
    }

    /// Remove a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.borrow_mut().retain(|s| s.id != id);
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}
