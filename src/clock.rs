//! Monotonic frame clock. The app feeds its deltas into `GameState::advance`.

use std::time::{Duration, Instant};

pub trait Clock {
    /// Seconds elapsed since the previous call (0 on the first call).
    fn tick(&mut self) -> f32;
}

/// Wall-clock deltas from `Instant`.
#[derive(Debug)]
pub struct SystemClock {
    last: Option<Instant>,
    /// Deltas above this are clamped (e.g. after the terminal was suspended).
    max_step: Duration,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last: None,
            max_step: Duration::from_millis(250),
        }
    }

    /// Forget the last sample so the next tick reports 0 (used when resuming).
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = self
            .last
            .map(|t| now.saturating_duration_since(t).min(self.max_step))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        delta.as_secs_f32()
    }
}

/// Fixed-step clock for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct ManualClock {
    pub step: f32,
}

impl Clock for ManualClock {
    fn tick(&mut self) -> f32 {
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_is_zero() {
        let mut clock = SystemClock::new();
        assert_eq!(clock.tick(), 0.0);
        assert!(clock.tick() >= 0.0);
        clock.reset();
        assert_eq!(clock.tick(), 0.0);
    }

    #[test]
    fn test_manual_clock_steps() {
        let mut clock = ManualClock { step: 0.05 };
        assert_eq!(clock.tick(), 0.05);
        assert_eq!(clock.tick(), 0.05);
    }
}
