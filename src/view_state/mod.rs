//! View-state layer - camera, animation, scheduling and minimap geometry
//!
//! Everything here is pure state plus arithmetic; nothing touches a
//! rendering backend. The controller drives these types and pushes the
//! results to the scene.
//!
//! # Module Structure
//!
//! - `scheduler`: Scheduler trait, ManualScheduler (virtual time), SystemScheduler
//! - `animation`: Easing curves and PanInterpolator
//! - `camera`: Camera - view position, clamping, Idle/Animating state machine
//! - `minimap`: MinimapFrame - overview scale, box placement, pointer mapping

pub mod animation;
pub mod camera;
pub mod minimap;
pub mod scheduler;

pub use animation::{Easing, PanInterpolator, UnknownEasing};
pub use camera::{clamp_view_pos, Camera, CameraConfig, CameraState, PanAnimation};
pub use minimap::{MinimapConfig, MinimapFrame};
pub use scheduler::{ManualScheduler, Scheduler, SystemScheduler, TimerId};
