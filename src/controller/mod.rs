//! View controller and its bindings.
//!
//! # Module Structure
//!
//! - `input`: pointer events and hit-testing
//! - `view_controller`: ViewController - camera, minimap, tree and scene
//! - `bridge`: DiagramView - the controller wired to the shared store

pub mod bridge;
pub mod input;
pub mod view_controller;

pub use bridge::DiagramView;
pub use input::{hit_test, hover_label, HitTarget, HitTestResult, PointerEvent};
pub use view_controller::{Effect, ViewController, ViewOptions};
