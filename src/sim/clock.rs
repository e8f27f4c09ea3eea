//! Tick rate limiter
//!
//! Gates how often the board advances, independent of how often the driver
//! loop runs. Calls before the period has elapsed are no-ops and a long gap
//! yields a single tick; missed ticks are never replayed.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct GameClock {
    period: Duration,
    resume_grace: Duration,
    /// Time of the last tick; may sit in the future right after a resume
    anchor: Instant,
}

impl GameClock {
    pub fn new(period: Duration, resume_grace: Duration, now: Instant) -> Self {
        Self {
            period,
            resume_grace,
            anchor: now,
        }
    }

    /// True once strictly more than one period has passed since the anchor
    pub fn ready(&self, now: Instant) -> bool {
        now.checked_duration_since(self.anchor)
            .is_some_and(|elapsed| elapsed > self.period)
    }

    /// Record that a tick ran at `now`
    pub fn mark(&mut self, now: Instant) {
        self.anchor = now;
    }

    /// Re-anchor after an unpause, pushed forward by the grace delay
    pub fn resume(&mut self, now: Instant) {
        self.anchor = now + self.resume_grace;
    }

    pub fn anchor(&self) -> Instant {
        self.anchor
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
