//! Timer state structure

use serde::{Deserialize, Serialize};

pub const DEFAULT_WORK_SECONDS: u64 = 25 * 60;
pub const DEFAULT_BREAK_SECONDS: u64 = 5 * 60;

/// Work/break countdown as persisted under `timerState` and sent to UIs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerState {
    pub time_left: u64,
    pub is_running: bool,
    pub is_break: bool,
    pub work_duration: u64,
    pub break_duration: u64,
}

impl TimerState {
    /// Create an idle timer at the start of a default work phase
    pub fn new() -> Self {
        Self {
            time_left: DEFAULT_WORK_SECONDS,
            is_running: false,
            is_break: false,
            work_duration: DEFAULT_WORK_SECONDS,
            break_duration: DEFAULT_BREAK_SECONDS,
        }
    }

    /// Duration of the phase the timer is currently in
    pub fn phase_duration(&self) -> u64 {
        if self.is_break {
            self.break_duration
        } else {
            self.work_duration
        }
    }

    /// Flip to the other phase and load its full duration.
    ///
    /// The next phase is never started automatically.
    pub fn complete_phase(&mut self) {
        self.is_break = !self.is_break;
        self.time_left = self.phase_duration();
        self.is_running = false;
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Compact `M:SS` countdown text for the badge
pub fn format_countdown(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_phase_enters_break_stopped() {
        let mut state = TimerState {
            time_left: 0,
            is_running: true,
            ..TimerState::new()
        };
        state.complete_phase();
        assert!(state.is_break);
        assert!(!state.is_running);
        assert_eq!(state.time_left, 300);

        state.complete_phase();
        assert!(!state.is_break);
        assert_eq!(state.time_left, 1500);
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(1500), "25:00");
        assert_eq!(format_countdown(61), "1:01");
        assert_eq!(format_countdown(9), "0:09");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let state: TimerState = serde_json::from_str(r#"{"timeLeft":42,"isRunning":true}"#).unwrap();
        assert_eq!(state.time_left, 42);
        assert!(state.is_running);
        assert_eq!(state.work_duration, DEFAULT_WORK_SECONDS);
        assert_eq!(state.break_duration, DEFAULT_BREAK_SECONDS);
    }
}
