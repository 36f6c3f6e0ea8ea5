//! Countdown match timer.
//!
//! A three-state machine driven by an external one-second cadence:
//!
//! ```text
//!            start                start
//!   ┌──────┐ ────▶ ┌─────────┐ ◀────── ┌────────┐
//!   │ Idle │       │ Running │  pause  │ Paused │
//!   └──────┘ ◀──── └─────────┘ ──────▶ └────────┘
//!      ▲    reset       │                   │
//!      └────────────────┴───── reset ───────┘
//! ```
//!
//! Invalid transitions are silent no-ops; nothing here errors.

use serde::{Deserialize, Serialize};

/// Countdown timer state. `is_running` and `is_paused` are mutually
/// exclusive; both false means idle at whatever time remains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTimer {
    /// Seconds left on the clock, never negative
    pub time_remaining: u32,
    pub is_running: bool,
    pub is_paused: bool,
}

impl MatchTimer {
    /// Create an idle timer holding a full match duration.
    pub fn new(duration_mins: u32) -> Self {
        Self {
            time_remaining: duration_mins * 60,
            is_running: false,
            is_paused: false,
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.is_running && !self.is_paused
    }

    /// Start or resume the countdown. No-op while already running.
    /// Returns whether the transition applied.
    pub fn start(&mut self) -> bool {
        if self.is_running {
            return false;
        }
        self.is_running = true;
        self.is_paused = false;
        true
    }

    /// Pause a running countdown. No-op otherwise.
    pub fn pause(&mut self) -> bool {
        if !self.is_running {
            return false;
        }
        self.is_running = false;
        self.is_paused = true;
        true
    }

    /// Stop and refill to a full match duration, from any state.
    pub fn reset(&mut self, duration_mins: u32) {
        self.time_remaining = duration_mins * 60;
        self.is_running = false;
        self.is_paused = false;
    }

    /// Advance the clock by one second, floored at zero. Ticking while not
    /// running is a no-op. Returns whether a tick applied.
    pub fn tick(&mut self) -> bool {
        if !self.is_running {
            return false;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        true
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "time_remaining": self.time_remaining,
            "is_running": self.is_running,
            "is_paused": self.is_paused,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_idle_with_full_duration() {
        let timer = MatchTimer::new(15);
        assert!(timer.is_idle());
        assert_eq!(timer.time_remaining, 900);
    }

    #[test]
    fn test_start_pause_resume() {
        let mut timer = MatchTimer::new(1);

        assert!(timer.start());
        assert!(timer.is_running && !timer.is_paused);

        assert!(timer.pause());
        assert!(!timer.is_running && timer.is_paused);

        // Resume from paused
        assert!(timer.start());
        assert!(timer.is_running && !timer.is_paused);
    }

    #[test]
    fn test_invalid_transitions_are_noops() {
        let mut timer = MatchTimer::new(1);

        // Pause while idle
        assert!(!timer.pause());
        assert!(timer.is_idle());

        // Start while running
        timer.start();
        assert!(!timer.start());
        assert!(timer.is_running);
    }

    #[test]
    fn test_tick_only_while_running() {
        let mut timer = MatchTimer::new(1);

        assert!(!timer.tick());
        assert_eq!(timer.time_remaining, 60);

        timer.start();
        assert!(timer.tick());
        assert_eq!(timer.time_remaining, 59);

        timer.pause();
        assert!(!timer.tick());
        assert_eq!(timer.time_remaining, 59);
    }

    #[test]
    fn test_tick_floors_at_zero() {
        let mut timer = MatchTimer::new(0);
        timer.start();

        timer.tick();
        timer.tick();

        assert_eq!(timer.time_remaining, 0);
        assert!(timer.is_running);
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut timer = MatchTimer::new(1);
        timer.start();
        timer.tick();
        timer.tick();

        timer.reset(2);

        assert!(timer.is_idle());
        assert_eq!(timer.time_remaining, 120);
    }
}
