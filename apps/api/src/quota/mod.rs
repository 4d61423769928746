//! Quota/retry controller for the AI service.
//!
//! A tiny state machine: `Idle` (requests permitted) → `Cooling(n)` after an
//! upstream rate-limit signal → back to `Idle` when the countdown reaches
//! zero. While cooling, enhancement attempts are rejected locally so an
//! already-throttled upstream is never hammered.
//!
//! The controller is the single writer of this state; everything else reads
//! snapshots. The mutex is held only across short, non-await sections.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

/// Cooldown applied when the upstream reports a rate limit without a delay.
pub const DEFAULT_COOLDOWN_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
enum QuotaState {
    Idle,
    Cooling {
        seconds_remaining: u64,
        message: String,
    },
}

/// Read-only view handed to the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaErrorState {
    pub is_active: bool,
    pub message: String,
    pub cooldown_seconds_remaining: u64,
}

pub struct QuotaController {
    state: Mutex<QuotaState>,
}

impl QuotaController {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QuotaState::Idle),
        }
    }

    /// Enters (or re-enters) the cooling state.
    ///
    /// A trip while already cooling replaces the remaining countdown with the
    /// newly reported delay — the upstream's latest signal wins.
    pub fn trip(&self, message: impl Into<String>, retry_after_seconds: u64) {
        let message = message.into();
        // Clamp so the cooling state is observable before the next tick.
        let seconds = retry_after_seconds.max(1);
        let mut state = self.state.lock().expect("quota mutex poisoned");
        info!(seconds, "AI quota exhausted, cooling down");
        *state = QuotaState::Cooling {
            seconds_remaining: seconds,
            message,
        };
    }

    /// One-second tick. At zero the state returns to `Idle` and the stored
    /// message is cleared.
    pub fn tick(&self) {
        let mut state = self.state.lock().expect("quota mutex poisoned");
        if let QuotaState::Cooling {
            seconds_remaining, ..
        } = &mut *state
        {
            *seconds_remaining -= 1;
            if *seconds_remaining == 0 {
                debug!("quota cooldown elapsed");
                *state = QuotaState::Idle;
            }
        }
    }

    /// Remaining cooldown, if a cooldown is running.
    pub fn active_cooldown(&self) -> Option<u64> {
        let state = self.state.lock().expect("quota mutex poisoned");
        match &*state {
            QuotaState::Idle => None,
            QuotaState::Cooling {
                seconds_remaining, ..
            } => Some(*seconds_remaining),
        }
    }

    pub fn snapshot(&self) -> QuotaErrorState {
        let state = self.state.lock().expect("quota mutex poisoned");
        match &*state {
            QuotaState::Idle => QuotaErrorState {
                is_active: false,
                message: String::new(),
                cooldown_seconds_remaining: 0,
            },
            QuotaState::Cooling {
                seconds_remaining,
                message,
            } => QuotaErrorState {
                is_active: true,
                message: message.clone(),
                cooldown_seconds_remaining: *seconds_remaining,
            },
        }
    }

    /// Spawns the background task that drives the countdown.
    pub fn spawn_ticker(self: &Arc<Self>) {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                controller.tick();
            }
        });
    }
}

impl Default for QuotaController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let controller = QuotaController::new();
        let snapshot = controller.snapshot();
        assert!(!snapshot.is_active);
        assert_eq!(snapshot.message, "");
        assert_eq!(snapshot.cooldown_seconds_remaining, 0);
        assert_eq!(controller.active_cooldown(), None);
    }

    #[test]
    fn test_trip_enters_cooling_with_reported_delay() {
        let controller = QuotaController::new();
        controller.trip("quota exceeded", 30);
        let snapshot = controller.snapshot();
        assert!(snapshot.is_active);
        assert_eq!(snapshot.cooldown_seconds_remaining, 30);
        assert_eq!(snapshot.message, "quota exceeded");
    }

    #[test]
    fn test_thirty_ticks_return_to_idle_with_cleared_message() {
        let controller = QuotaController::new();
        controller.trip("quota exceeded", 30);
        for _ in 0..29 {
            controller.tick();
        }
        assert_eq!(controller.active_cooldown(), Some(1));
        controller.tick();
        let snapshot = controller.snapshot();
        assert!(!snapshot.is_active);
        assert_eq!(snapshot.message, "");
        assert_eq!(snapshot.cooldown_seconds_remaining, 0);
    }

    #[test]
    fn test_tick_while_idle_is_a_no_op() {
        let controller = QuotaController::new();
        controller.tick();
        assert!(!controller.snapshot().is_active);
    }

    #[test]
    fn test_second_trip_replaces_running_countdown() {
        let controller = QuotaController::new();
        controller.trip("first", 60);
        for _ in 0..10 {
            controller.tick();
        }
        assert_eq!(controller.active_cooldown(), Some(50));

        // A fresh rate-limit signal replaces the remainder, in either direction.
        controller.trip("second", 30);
        assert_eq!(controller.active_cooldown(), Some(30));
        assert_eq!(controller.snapshot().message, "second");
    }

    #[test]
    fn test_zero_delay_is_clamped_to_one_tick() {
        let controller = QuotaController::new();
        controller.trip("burst", 0);
        assert_eq!(controller.active_cooldown(), Some(1));
        controller.tick();
        assert_eq!(controller.active_cooldown(), None);
    }
}
