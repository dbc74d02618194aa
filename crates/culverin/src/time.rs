//! Frame timing.
//!
//! The [`Time`] clock is owned by the [`World`](crate::ecs::World) and stepped
//! once per tick by the driver. Fire cooldowns and destruction grace delays
//! compare against [`Time::elapsed`] — there is no timer thread; everything
//! timed is polled once per tick.

use std::time::{Duration, Instant};

/// Per-tick clock. Step it with [`update`](Time::update) for wall-clock time,
/// or [`advance`](Time::advance) to drive it manually (headless runs, tests).
#[derive(Clone, Copy)]
pub struct Time {
    frame_start: Instant,
    delta: Duration,
    elapsed: Duration,
    tick_count: u64,
}

impl Time {
    pub(crate) fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            tick_count: 0,
        }
    }

    /// Step to the current wall-clock instant. Call once at the top of a tick.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.advance(now - self.frame_start);
        self.frame_start = now;
    }

    /// Step by an explicit amount, ignoring the wall clock.
    pub fn advance(&mut self, dt: Duration) {
        self.delta = dt;
        self.elapsed += dt;
        self.tick_count += 1;
    }

    /// Duration of the previous tick.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Total simulated time since the world was created.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of ticks stepped so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
