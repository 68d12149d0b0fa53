//! Scene reconciliation.
//!
//! - `backend`: RenderBackend trait, element handles and attribute structs
//! - `registry`: RenderRegistry and the keyed set-difference
//! - `reconciler`: Reconciler - full and partial update passes
//! - `recording`: RecordingBackend - retained in-memory scene

pub mod backend;
pub mod reconciler;
pub mod recording;
pub mod registry;

pub use backend::{
    ElementHandle, Layer, MinimapNodeAttrs, NodeAttrs, OverlayHandles, RenderBackend, Transition,
};
pub use reconciler::{ReconcileStats, Reconciler, UpdateMode, DEFAULT_TRANSITION};
pub use recording::{OpCounts, RecordingBackend, Scene, SceneDecoration, SceneElement};
pub use registry::{diff_keys, KeyDiff, RenderRegistry};
