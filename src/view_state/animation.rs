//! Easing curves and pan interpolation.

use crate::model::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f64) -> f64;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic ease-out (slower end than quadratic).
#[inline]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Named easing curve, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Constant velocity.
    Linear,
    /// Quadratic ease-in-out.
    #[default]
    EaseInOut,
    /// Cubic ease-out.
    EaseOutCubic,
}

impl Easing {
    /// The curve as a plain function.
    pub fn function(self) -> EasingFn {
        match self {
            Easing::Linear => linear,
            Easing::EaseInOut => ease_in_out,
            Easing::EaseOutCubic => ease_out_cubic,
        }
    }

    /// Apply the curve to `t`.
    pub fn apply(self, t: f64) -> f64 {
        (self.function())(t)
    }

    fn as_str(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseInOut => "ease-in-out",
            Easing::EaseOutCubic => "ease-out-cubic",
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised easing name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown easing '{0}' (expected linear, ease-in-out or ease-out-cubic)")]
pub struct UnknownEasing(pub String);

impl FromStr for Easing {
    type Err = UnknownEasing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Easing::Linear),
            "ease-in-out" => Ok(Easing::EaseInOut),
            "ease-out-cubic" => Ok(Easing::EaseOutCubic),
            other => Err(UnknownEasing(other.to_string())),
        }
    }
}

/// Interpolates the view position between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanInterpolator {
    /// Start position.
    pub from: Point,
    /// Target position.
    pub to: Point,
    /// Curve applied to the time fraction.
    pub easing: Easing,
}

impl PanInterpolator {
    /// Create an interpolator.
    pub fn new(from: Point, to: Point, easing: Easing) -> Self {
        Self { from, to, easing }
    }

    /// Position at time fraction `t`.
    ///
    /// `t >= 1` returns `to` exactly, so a finished animation never leaves
    /// rounding residue in the view position.
    pub fn sample(&self, t: f64) -> Point {
        if t >= 1.0 {
            return self.to;
        }
        Point::lerp(self.from, self.to, self.easing.apply(t))
    }
}
