//! Minimap geometry.
//!
//! The minimap is a scaled copy of the whole diagram drawn in a box anchored
//! to the bottom-right corner of the surface, with an overlay rectangle
//! showing the visible part. [`MinimapFrame`] holds the derived numbers and
//! maps pointer positions inside the box back to world space.

use crate::model::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Minimap tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinimapConfig {
    /// The box is the viewport divided by this, per axis.
    pub divisor: f64,
    /// Minimum box side.
    pub min_box: f64,
    /// Gap between the box and the surface's bottom-right corner.
    pub margin: f64,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            divisor: 5.0,
            min_box: 100.0,
            margin: 20.0,
        }
    }
}

/// Derived minimap geometry for one viewport/content/position triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MinimapFrame {
    /// Uniform world-to-minimap scale.
    pub scale: f64,
    /// Top-left corner of the box on the surface.
    pub origin: Point,
    /// Box size.
    pub box_size: Size,
    /// Visible-region overlay in box-local coordinates.
    pub visible: Rect,
}

impl MinimapFrame {
    /// Compute the frame.
    ///
    /// The raw box is `max(min_box, viewport / divisor)`; the scale fits the
    /// content into it, and the final box is `max(min_box, content * scale)`.
    /// Content sides are floored at one pixel so an empty diagram cannot
    /// produce an infinite scale.
    pub fn compute(
        viewport: Size,
        content: Size,
        view_pos: Point,
        config: &MinimapConfig,
    ) -> Self {
        let raw_w = config.min_box.max(viewport.width / config.divisor);
        let raw_h = config.min_box.max(viewport.height / config.divisor);
        let content_w = content.width.max(1.0);
        let content_h = content.height.max(1.0);

        let scale = (raw_w / content_w).min(raw_h / content_h);
        let box_size = Size::new(
            config.min_box.max(content.width * scale),
            config.min_box.max(content.height * scale),
        );
        let origin = Point::new(
            viewport.width - box_size.width - config.margin,
            viewport.height - box_size.height - config.margin,
        );
        let visible = Rect::new(
            view_pos.x * scale,
            view_pos.y * scale,
            viewport.width * scale,
            viewport.height * scale,
        );

        Self {
            scale,
            origin,
            box_size,
            visible,
        }
    }

    /// Box bounds on the surface.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin(self.origin, self.box_size)
    }

    /// Whether a surface point falls inside the box.
    pub fn contains(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// World position under a surface point inside the box.
    pub fn to_world(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.origin.x) / self.scale,
            (point.y - self.origin.y) / self.scale,
        )
    }

    /// View position that centres the world point under `point`.
    pub fn click_target(&self, point: Point, viewport: Size) -> Point {
        let world = self.to_world(point);
        Point::new(
            world.x - viewport.width / 2.0,
            world.y - viewport.height / 2.0,
        )
    }

    /// World-space pan for a pointer drag of `(dx, dy)` inside the box.
    pub fn drag_delta(&self, dx: f64, dy: f64) -> Point {
        Point::new(dx / self.scale, dy / self.scale)
    }
}
