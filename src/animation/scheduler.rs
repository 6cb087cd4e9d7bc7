use std::time::Duration;

use rand::RngExt;
use rand::rngs::StdRng;

/// Identifies one arming of a [`ClipScheduler`]. A handle goes stale as
/// soon as the scheduler is re-armed or cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct PendingChange {
    deadline: Duration,
    interval: Duration,
    handle: TimerHandle,
}

/// One-shot timer that fires the next random clip change.
///
/// At most one change is pending at a time: arming replaces whatever was
/// pending. The timer is deadline based and is polled from the frame loop
/// against an injected clock, so nothing fires between frames.
#[derive(Debug, Clone)]
pub struct ClipScheduler {
    min_interval_ms: u64,
    max_interval_ms: u64,
    pending: Option<PendingChange>,
    generation: u64,
}

impl ClipScheduler {
    #[must_use]
    pub fn new(min_interval_ms: u64, max_interval_ms: u64) -> Self {
        Self {
            min_interval_ms: min_interval_ms.min(max_interval_ms),
            max_interval_ms: max_interval_ms.max(min_interval_ms),
            pending: None,
            generation: 0,
        }
    }

    /// Draws a fresh interval and schedules the next fire relative to `now`,
    /// replacing any pending fire.
    pub fn arm(&mut self, now: Duration, rng: &mut StdRng) -> TimerHandle {
        let interval = self.draw_interval(rng);
        self.generation = self.generation.wrapping_add(1);
        let handle = TimerHandle {
            generation: self.generation,
        };
        self.pending = Some(PendingChange {
            deadline: now + interval,
            interval,
            handle,
        });
        log::trace!("Next clip change in {} ms", interval.as_millis());
        handle
    }

    /// Drops the pending fire. Returns whether anything was pending.
    pub fn cancel(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        self.pending.take().is_some()
    }

    /// Returns `true` exactly once when the pending deadline has passed.
    /// The scheduler is disarmed afterwards; the caller re-arms it.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.pending {
            Some(pending) if now >= pending.deadline => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether `handle` still refers to the pending fire.
    #[must_use]
    pub fn is_current(&self, handle: TimerHandle) -> bool {
        self.pending.is_some_and(|p| p.handle == handle)
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.map(|p| p.deadline)
    }

    /// Interval drawn by the latest arming, if still pending.
    #[must_use]
    pub fn pending_interval(&self) -> Option<Duration> {
        self.pending.map(|p| p.interval)
    }

    #[must_use]
    pub fn interval_bounds(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.min_interval_ms),
            Duration::from_millis(self.max_interval_ms),
        )
    }

    fn draw_interval(&self, rng: &mut StdRng) -> Duration {
        Duration::from_millis(rng.random_range(self.min_interval_ms..=self.max_interval_ms))
    }
}
