//! Day counter driving the vault/war cycle.

use std::time::Duration;

/// Simulated time a vault day lasts.
pub const DAY_LENGTH: Duration = Duration::from_secs(60);

/// Tracks the current day and whether the shelter is at war.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayClock {
    day: u32,
    elapsed: Duration,
    day_length: Duration,
    at_war: bool,
}

impl Default for DayClock {
    fn default() -> Self {
        Self::new(DAY_LENGTH)
    }
}

impl DayClock {
    /// Starts on day one at dawn.
    #[must_use]
    pub const fn new(day_length: Duration) -> Self {
        Self {
            day: 1,
            elapsed: Duration::ZERO,
            day_length,
            at_war: false,
        }
    }

    /// Current day, starting at one.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Reports whether a wave is being fought.
    #[must_use]
    pub const fn is_at_war(&self) -> bool {
        self.at_war
    }

    /// Fraction of the current day that has passed.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.day_length.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.day_length.as_secs_f32()).min(1.0)
    }

    /// Advances vault time. Returns `true` when the day ran out and war begins.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.at_war {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed < self.day_length {
            return false;
        }
        self.begin_war()
    }

    /// Enters war mode ahead of time. Returns `false` when already at war.
    pub fn begin_war(&mut self) -> bool {
        if self.at_war {
            return false;
        }
        self.at_war = true;
        self.elapsed = Duration::ZERO;
        true
    }

    /// Leaves war mode and starts the next day, returning it.
    pub fn finish_war(&mut self) -> u32 {
        self.at_war = false;
        self.elapsed = Duration::ZERO;
        self.day = self.day.saturating_add(1);
        self.day
    }

    /// Jumps to a saved day at dawn.
    pub fn restore(&mut self, day: u32) {
        self.day = day.max(1);
        self.elapsed = Duration::ZERO;
        self.at_war = false;
    }
}
