//! Wire shapes for commands, replies and broadcasts

use serde::{Deserialize, Serialize};

use crate::{
    services::tabs::TabId,
    state::{Settings, TimerState},
};

/// Commands issued by UI contexts and answered by the background process.
///
/// Required fields are optional here so that an incomplete command decodes
/// and is then ignored rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    SettingsUpdated {
        #[serde(default)]
        settings: Option<Settings>,
    },
    #[serde(rename_all = "camelCase")]
    StartTimer {
        #[serde(default)]
        time_left: Option<u64>,
        #[serde(default)]
        is_break: Option<bool>,
        #[serde(default)]
        work_duration: Option<u64>,
        #[serde(default)]
        break_duration: Option<u64>,
    },
    PauseTimer,
    #[serde(rename_all = "camelCase")]
    ResetTimer {
        #[serde(default)]
        time_left: Option<u64>,
        #[serde(default)]
        work_duration: Option<u64>,
        #[serde(default)]
        break_duration: Option<u64>,
    },
    GetTimerState,
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::SettingsUpdated { .. } => "SETTINGS_UPDATED",
            Request::StartTimer { .. } => "START_TIMER",
            Request::PauseTimer => "PAUSE_TIMER",
            Request::ResetTimer { .. } => "RESET_TIMER",
            Request::GetTimerState => "GET_TIMER_STATE",
        }
    }
}

/// Reply to a [`Request`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Ack { success: bool },
    Error { error: String },
    Timer(TimerState),
}

impl Response {
    pub fn success() -> Self {
        Response::Ack { success: true }
    }

    pub fn internal_error() -> Self {
        Response::Error {
            error: "Internal error".to_string(),
        }
    }
}

/// Fire-and-forget broadcast from the background process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    TimerUpdate {
        #[serde(flatten)]
        state: TimerState,
        #[serde(rename = "showNotification")]
        show_notification: bool,
    },
    /// Alert for the host to render
    Notification { title: String, message: String },
    /// Instruction for the host to navigate a tab
    #[serde(rename_all = "camelCase")]
    RedirectTab { tab_id: TabId, url: String },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::TimerUpdate { .. } => "TIMER_UPDATE",
            Event::Notification { .. } => "NOTIFICATION",
            Event::RedirectTab { .. } => "REDIRECT_TAB",
        }
    }
}
