//! Request handling for commands coming from UI contexts

use tracing::{debug, error};

use super::messages::{Request, Response};
use crate::{
    background::Background,
    state::timer_state::{DEFAULT_BREAK_SECONDS, DEFAULT_WORK_SECONDS},
};

/// Answer `request` against the background state.
///
/// Returns `None` when a required field is missing: the command has no
/// effect and gets no answer, which the caller treats like a closed channel.
/// Every other request gets exactly one response, `{error}` on failure.
pub fn dispatch(background: &Background, request: Request) -> Option<Response> {
    let name = request.name();
    background.state.record_command(name);

    let result = match request {
        Request::SettingsUpdated { settings: Some(mut settings) } => {
            settings.work_duration = duration_or(Some(settings.work_duration), DEFAULT_WORK_SECONDS);
            settings.break_duration = duration_or(Some(settings.break_duration), DEFAULT_BREAK_SECONDS);
            background.apply_settings(settings);
            Ok(Response::success())
        }
        Request::StartTimer {
            time_left: Some(time_left),
            is_break,
            work_duration,
            break_duration,
        } => background
            .timer
            .start(
                time_left,
                is_break.unwrap_or(false),
                duration_or(work_duration, DEFAULT_WORK_SECONDS),
                duration_or(break_duration, DEFAULT_BREAK_SECONDS),
            )
            .map(|_| Response::success()),
        Request::PauseTimer => background.timer.pause().map(|_| Response::success()),
        Request::ResetTimer {
            time_left: Some(time_left),
            work_duration,
            break_duration,
        } => background
            .timer
            .reset(
                time_left,
                duration_or(work_duration, DEFAULT_WORK_SECONDS),
                duration_or(break_duration, DEFAULT_BREAK_SECONDS),
            )
            .map(|_| Response::success()),
        Request::GetTimerState => background.timer.state().map(Response::Timer),
        Request::SettingsUpdated { settings: None }
        | Request::StartTimer { time_left: None, .. }
        | Request::ResetTimer { time_left: None, .. } => {
            debug!("Ignoring {} without its required field", name);
            return None;
        }
    };

    Some(result.unwrap_or_else(|e| {
        error!("Error handling {}: {}", name, e);
        Response::internal_error()
    }))
}

/// Durations must be positive; zero or missing falls back to the default
fn duration_or(duration: Option<u64>, default: u64) -> u64 {
    duration.filter(|d| *d > 0).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::store::{self, SETTINGS_KEY},
        state::{Mode, Settings, TimerState},
        testing::TestHarness,
    };
    use std::sync::Arc;

    fn background(harness: &TestHarness) -> Arc<Background> {
        Background::start(harness.state.clone(), harness.tabs.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_then_get_state() {
        let harness = TestHarness::new();
        let background = background(&harness);

        let reset = Request::ResetTimer {
            time_left: Some(1500),
            work_duration: Some(1500),
            break_duration: Some(300),
        };
        assert_eq!(dispatch(&background, reset), Some(Response::success()));
        assert_eq!(
            dispatch(&background, Request::GetTimerState),
            Some(Response::Timer(TimerState {
                time_left: 1500,
                is_running: false,
                is_break: false,
                work_duration: 1500,
                break_duration: 300,
            }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_fills_defaults() {
        let harness = TestHarness::new();
        let background = background(&harness);

        let start = Request::StartTimer {
            time_left: Some(900),
            is_break: None,
            work_duration: Some(0),
            break_duration: None,
        };
        assert_eq!(dispatch(&background, start), Some(Response::success()));

        let state = background.timer.state().unwrap();
        assert!(state.is_running);
        assert!(!state.is_break);
        assert_eq!(state.work_duration, DEFAULT_WORK_SECONDS);
        assert_eq!(state.break_duration, DEFAULT_BREAK_SECONDS);
        assert_eq!(background.state.get_last_command().0.as_deref(), Some("START_TIMER"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_required_field_is_a_no_op() {
        let harness = TestHarness::new();
        let background = background(&harness);
        let before = background.timer.state().unwrap();

        let start = Request::StartTimer {
            time_left: None,
            is_break: Some(true),
            work_duration: None,
            break_duration: None,
        };
        assert_eq!(dispatch(&background, start), None);
        assert_eq!(dispatch(&background, Request::SettingsUpdated { settings: None }), None);
        assert_eq!(background.timer.state().unwrap(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_updated_replaces_and_persists() {
        let harness = TestHarness::new();
        let background = background(&harness);
        let settings = Settings { mode: Mode::Creative, is_enabled: false, ..Settings::default() };

        let request = Request::SettingsUpdated { settings: Some(settings.clone()) };
        assert_eq!(dispatch(&background, request), Some(Response::success()));

        assert_eq!(background.state.settings(), settings);
        let stored: Option<Settings> = store::load(harness.state.stores.sync.as_ref(), SETTINGS_KEY);
        assert_eq!(stored, Some(settings));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_zero_durations_fall_back_to_defaults() {
        let harness = TestHarness::new();
        let background = background(&harness);
        let settings = Settings { work_duration: 0, break_duration: 0, ..Settings::default() };

        let request = Request::SettingsUpdated { settings: Some(settings) };
        assert_eq!(dispatch(&background, request), Some(Response::success()));

        let applied = background.state.settings();
        assert_eq!(applied.work_duration, DEFAULT_WORK_SECONDS);
        assert_eq!(applied.break_duration, DEFAULT_BREAK_SECONDS);
        let stored: Option<Settings> = store::load(harness.state.stores.sync.as_ref(), SETTINGS_KEY);
        assert_eq!(stored, Some(applied));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_answers_even_when_idle() {
        let harness = TestHarness::new();
        let background = background(&harness);
        assert_eq!(dispatch(&background, Request::PauseTimer), Some(Response::success()));
        assert_eq!(dispatch(&background, Request::PauseTimer), Some(Response::success()));
    }
}
