//! Viewport camera: pan offset, clamping and animated pans.
//!
//! # State machine
//!
//! ```text
//!            pan_to(immediate)             pan_to(animated)
//!   Idle ─────────────────────► Idle   Idle ───────────────► Animating
//!   Animating ── pan_to(immediate) / stop ──► Idle
//!   Animating ── pan_to(animated) ──► Animating (old timer cancelled)
//!   Animating ── on_timer(t >= 1) ──► Idle (snapped to target)
//! ```
//!
//! The camera owns at most one timer. Every transition out of `Animating`
//! cancels it, so two interpolations can never race.

use super::animation::{Easing, PanInterpolator};
use super::scheduler::{Scheduler, TimerId};
use crate::model::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

/// Camera tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Length of an animated pan.
    #[serde(with = "millis")]
    pub duration: Duration,
    /// Interval between animation ticks.
    #[serde(with = "millis")]
    pub tick: Duration,
    /// Curve of animated pans.
    pub easing: Easing,
    /// Minimum gap kept between the viewport edge and an auto-panned node.
    pub autopan_margin: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(200),
            tick: Duration::from_millis(10),
            easing: Easing::default(),
            autopan_margin: 10.0,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Clamp a requested view position to the content bounds.
///
/// The upper bound `content - viewport` may be negative when the content is
/// smaller than the viewport; applying `min` before `max` pins the result
/// to 0 in that case. Without content only the lower bound applies.
pub fn clamp_view_pos(pos: Point, content: Option<Size>, viewport: Size) -> Point {
    let (mut x, mut y) = (pos.x, pos.y);
    if let Some(content) = content {
        x = x.min(content.width - viewport.width);
        y = y.min(content.height - viewport.height);
    }
    Point::new(x.max(0.0), y.max(0.0))
}

/// An in-flight animated pan.
#[derive(Debug, Clone, PartialEq)]
pub struct PanAnimation {
    /// Start and target positions.
    pub interpolator: PanInterpolator,
    /// Scheduler time the animation started at.
    pub started_at: Duration,
    /// Total length.
    pub duration: Duration,
    /// Pending tick.
    pub timer: TimerId,
}

impl PanAnimation {
    fn fraction(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        now.saturating_sub(self.started_at).as_secs_f64() / self.duration.as_secs_f64()
    }
}

/// Camera state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CameraState {
    /// Static view position.
    #[default]
    Idle,
    /// Interpolating toward a target.
    Animating(PanAnimation),
}

/// Viewport over the world-space diagram.
#[derive(Debug, Clone)]
pub struct Camera {
    config: CameraConfig,
    size: Size,
    view_pos: Point,
    content: Option<Size>,
    state: CameraState,
}

impl Camera {
    /// Idle camera at the origin with a zero-sized viewport.
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            size: Size::ZERO,
            view_pos: Point::ZERO,
            content: None,
            state: CameraState::Idle,
        }
    }

    /// Tuning in effect.
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Viewport size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Top-left world position of the viewport.
    pub fn view_pos(&self) -> Point {
        self.view_pos
    }

    /// Content bounds used for clamping.
    pub fn content(&self) -> Option<Size> {
        self.content
    }

    /// Current state.
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    /// Whether an animated pan is in flight.
    pub fn is_animating(&self) -> bool {
        matches!(self.state, CameraState::Animating(_))
    }

    /// Target of the in-flight animation, if any.
    pub fn target(&self) -> Option<Point> {
        match &self.state {
            CameraState::Animating(anim) => Some(anim.interpolator.to),
            CameraState::Idle => None,
        }
    }

    /// Visible world rectangle.
    pub fn visible_rect(&self) -> Rect {
        Rect::from_origin(self.view_pos, self.size)
    }

    /// Offset applied to the root element: `translate(-view_pos)`.
    pub fn root_transform(&self) -> Point {
        self.view_pos.negate()
    }

    /// Clamp `pos` against the current content and viewport.
    pub fn clamp(&self, pos: Point) -> Point {
        clamp_view_pos(pos, self.content, self.size)
    }

    /// Update the viewport size and re-clamp the current position.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.reclamp();
    }

    /// Replace the content bounds and re-clamp the current position.
    pub fn set_content(&mut self, content: Option<Size>) {
        self.content = content;
        self.reclamp();
    }

    /// Re-clamp the position and an in-flight animation's endpoints after
    /// the bounds changed.
    fn reclamp(&mut self) {
        let (content, size) = (self.content, self.size);
        self.view_pos = clamp_view_pos(self.view_pos, content, size);
        if let CameraState::Animating(anim) = &mut self.state {
            anim.interpolator.from = clamp_view_pos(anim.interpolator.from, content, size);
            anim.interpolator.to = clamp_view_pos(anim.interpolator.to, content, size);
        }
    }

    /// Pan to `target`, clamped. Returns the clamped target.
    ///
    /// Immediate pans snap and leave the camera idle. Animated pans start a
    /// new interpolation from the current position. Either way a running
    /// animation is cancelled first.
    pub fn pan_to(&mut self, target: Point, immediate: bool, sched: &dyn Scheduler) -> Point {
        let target = self.clamp(target);
        self.stop(sched);

        if immediate {
            self.view_pos = target;
            return target;
        }

        let interpolator = PanInterpolator::new(self.view_pos, target, self.config.easing);
        trace!(from = ?self.view_pos, to = ?target, "pan animation started");
        self.state = CameraState::Animating(PanAnimation {
            interpolator,
            started_at: sched.now(),
            duration: self.config.duration,
            timer: sched.schedule(self.config.tick),
        });
        target
    }

    /// Advance the animation for fired timer `id`.
    ///
    /// Returns `true` when the view position was updated. Timers the camera
    /// does not own (stale ids from cancelled animations) are ignored.
    pub fn on_timer(&mut self, id: TimerId, sched: &dyn Scheduler) -> bool {
        let CameraState::Animating(anim) = &mut self.state else {
            return false;
        };
        if anim.timer != id {
            return false;
        }

        let t = anim.fraction(sched.now());
        self.view_pos = clamp_view_pos(anim.interpolator.sample(t), self.content, self.size);
        if t >= 1.0 {
            trace!(at = ?self.view_pos, "pan animation finished");
            self.state = CameraState::Idle;
        } else {
            anim.timer = sched.schedule(self.config.tick);
        }
        true
    }

    /// Cancel any animation, keeping the current position.
    pub fn stop(&mut self, sched: &dyn Scheduler) {
        if let CameraState::Animating(anim) = std::mem::take(&mut self.state) {
            sched.cancel(anim.timer);
        }
    }

    /// View position that brings `node` into view.
    ///
    /// Centres the node when it fits; otherwise keeps its top-left corner
    /// `autopan_margin` away from the viewport edge.
    pub fn focus_target(&self, node: Rect) -> Point {
        let margin = self.config.autopan_margin;
        Point::new(
            node.x - (self.size.width / 2.0 - node.width / 2.0).max(margin),
            node.y - (self.size.height / 2.0 - node.height / 2.0).max(margin),
        )
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
