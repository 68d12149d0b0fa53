//! World-space geometry primitives.
//!
//! All coordinates are in device pixels of the full-size diagram ("world
//! space") unless a type documents otherwise.

use serde::{Deserialize, Serialize};

/// A point or offset in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Origin `(0, 0)`.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Negated point, used for the root render transform.
    pub fn negate(self) -> Self {
        Self::new(-self.x, -self.y)
    }

    /// Linear interpolation between `from` and `to` at fraction `t`.
    pub fn lerp(from: Self, to: Self, t: f64) -> Self {
        Self::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t)
    }
}

/// Width and height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Size {
    /// Zero-sized extent.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Uniformly scaled size.
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle from an origin and a size.
    pub fn from_origin(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Extent of the rectangle.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `p` lies inside the rectangle (edges inclusive on the
    /// top/left, exclusive on the bottom/right).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Rectangle translated by `offset`.
    pub fn translate(&self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints_are_exact() {
        let a = Point::new(0.0, 10.0);
        let b = Point::new(50.0, 60.0);
        assert_eq!(Point::lerp(a, b, 0.0), a);
        assert_eq!(Point::lerp(a, b, 1.0), b);
        assert_eq!(Point::lerp(a, b, 0.5), Point::new(25.0, 35.0));
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(29.9, 14.9)));
        assert!(!r.contains(Point::new(30.0, 12.0)));
        assert!(!r.contains(Point::new(15.0, 15.0)));
        assert!(!r.contains(Point::new(9.9, 12.0)));
    }

    #[test]
    fn translate_moves_origin_only() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0).translate(Point::new(10.0, 20.0));
        assert_eq!(r, Rect::new(11.0, 22.0, 3.0, 4.0));
    }

    #[test]
    fn negate_flips_both_axes() {
        assert_eq!(Point::new(3.0, -4.0).negate(), Point::new(-3.0, 4.0));
    }
}
