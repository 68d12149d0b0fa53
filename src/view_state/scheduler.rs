//! Timer scheduling for camera animation.
//!
//! The camera never sleeps or spawns anything itself. It asks a [`Scheduler`]
//! for a one-shot timer and the host calls back into the camera when the
//! timer fires. Two implementations are provided: [`ManualScheduler`] with
//! virtual time for tests and headless runs, and [`SystemScheduler`] backed
//! by the monotonic clock for the terminal loop.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Handle of a scheduled one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Source of time and one-shot timers.
///
/// All methods take `&self`; implementations use interior mutability so a
/// scheduler can be shared by reference while the camera holds its timer.
pub trait Scheduler {
    /// Time elapsed since the scheduler's epoch.
    fn now(&self) -> Duration;

    /// Schedule a timer firing `delay` from now.
    fn schedule(&self, delay: Duration) -> TimerId;

    /// Cancel a timer. Unknown or already-fired ids are ignored.
    fn cancel(&self, id: TimerId);
}

/// Pending timers ordered by deadline, then by id.
#[derive(Debug, Default)]
struct TimerQueue {
    next_id: Cell<u64>,
    pending: RefCell<BTreeSet<(Duration, TimerId)>>,
}

impl TimerQueue {
    fn push(&self, deadline: Duration) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.pending.borrow_mut().insert((deadline, id));
        id
    }

    fn cancel(&self, id: TimerId) {
        self.pending.borrow_mut().retain(|(_, pending)| *pending != id);
    }

    /// Remove and return every timer due at or before `now`, earliest first.
    fn drain_due(&self, now: Duration) -> Vec<TimerId> {
        let mut pending = self.pending.borrow_mut();
        let due: Vec<(Duration, TimerId)> = pending
            .iter()
            .take_while(|(deadline, _)| *deadline <= now)
            .copied()
            .collect();
        for key in &due {
            pending.remove(key);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.pending.borrow().first().map(|(deadline, _)| *deadline)
    }

    fn len(&self) -> usize {
        self.pending.borrow().len()
    }
}

/// Virtual-time scheduler. Time only moves through [`advance`](Self::advance).
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    queue: TimerQueue,
}

impl ManualScheduler {
    /// Scheduler at time zero with no timers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `by` and return the timers that came due,
    /// earliest first.
    pub fn advance(&self, by: Duration) -> Vec<TimerId> {
        self.now.set(self.now.get() + by);
        self.queue.drain_due(self.now.get())
    }

    /// Number of timers not yet fired or cancelled.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn schedule(&self, delay: Duration) -> TimerId {
        self.queue.push(self.now.get() + delay)
    }

    fn cancel(&self, id: TimerId) {
        self.queue.cancel(id);
    }
}

/// Wall-clock scheduler polled by an event loop.
#[derive(Debug)]
pub struct SystemScheduler {
    epoch: Instant,
    queue: TimerQueue,
}

impl Default for SystemScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemScheduler {
    /// Scheduler whose epoch is now.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            queue: TimerQueue::default(),
        }
    }

    /// Remove and return the timers that are due.
    pub fn due(&self) -> Vec<TimerId> {
        self.queue.drain_due(self.now())
    }

    /// Time until the earliest pending timer; `None` without timers.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(self.now()))
    }
}

impl Scheduler for SystemScheduler {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn schedule(&self, delay: Duration) -> TimerId {
        self.queue.push(self.now() + delay)
    }

    fn cancel(&self, id: TimerId) {
        self.queue.cancel(id);
    }
}
