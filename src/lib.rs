//! topoview
//!
//! Pannable topology diagram: a layout tree adapter over hierarchical source
//! data, a camera with animated panning, a minimap, and a keyed scene
//! reconciler that turns layout changes into minimal backend operations.
//!
//! The core (`layout`, `view_state`, `scene`, `controller`, `store`) is
//! backend-agnostic. `view` is the terminal shell that rasterises the
//! recorded scene with ratatui.

pub mod config;
pub mod controller;
pub mod layout;
pub mod logging;
pub mod model;
pub mod scene;
pub mod source;
pub mod store;
pub mod view;
pub mod view_state;
