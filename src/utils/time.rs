use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Monotonic time source.
///
/// The scheduler only ever compares readings from the same clock, so the
/// epoch is arbitrary.
pub trait Clock {
    /// Time elapsed since the clock's epoch.
    fn now(&self) -> Duration;
}

/// Wall clock backed by `Instant` (`web_time::Instant` on wasm).
#[derive(Debug, Clone)]
pub struct SystemClock {
    start_time: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the director.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.nanos
            .fetch_add(by.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    pub fn set(&self, to: Duration) {
        self.nanos.store(to.as_nanos() as u64, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Relaxed))
    }
}

/// Per-frame delta tracker for hosts that do not supply their own delta.
pub struct FrameTimer<C: Clock> {
    clock: C,
    last_update: Duration,
    /// Time since last tick
    pub delta: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl<C: Clock> FrameTimer<C> {
    #[must_use]
    pub fn new(clock: C) -> Self {
        let now = clock.now();
        Self {
            clock,
            last_update: now,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Samples the clock once; call exactly once per frame.
    pub fn tick(&mut self) -> f32 {
        let now = self.clock.now();
        self.delta = now.saturating_sub(self.last_update);
        self.last_update = now;
        self.frame_count += 1;
        self.dt_seconds()
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}
