//! Dimension and timing constants for the terminal front-end.
//!
//! Centralized location for the numeric values the event loop and the scene
//! rasteriser share.

use std::time::Duration;

/// Height of the status bar in lines.
///
/// Single line at the bottom of the screen for the selection, auto-pan state
/// and keyboard hints.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Two clicks on the same cell within this window form a double click.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

/// Event poll timeout while no animation timer is pending.
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Fraction of the viewport an arrow key pans by.
pub const ARROW_PAN_FRACTION: f64 = 0.25;

/// Wheel notches pan by this many terminal rows (or columns with shift).
pub const WHEEL_PAN_CELLS: f64 = 3.0;
