//! User settings shared by every component

use serde::{Deserialize, Serialize};

use super::timer_state::{DEFAULT_BREAK_SECONDS, DEFAULT_WORK_SECONDS};

/// Blocking mode selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// Track only
    #[default]
    Normal,
    /// Block distracting sites outright
    DeepWork,
    /// Allow a grace period before blocking
    Creative,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::DeepWork => "deepWork",
            Mode::Creative => "creative",
        }
    }
}

/// Settings as stored under `settings` in the sync tier.
///
/// Always replaced as a whole, never patched field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Master switch for notifications and blocking
    pub is_enabled: bool,
    pub work_duration: u64,
    pub break_duration: u64,
    pub mode: Mode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            is_enabled: true,
            work_duration: DEFAULT_WORK_SECONDS,
            break_duration: DEFAULT_BREAK_SECONDS,
            mode: Mode::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_wire_names() {
        let settings: Settings = serde_json::from_str(r#"{"isEnabled":false,"mode":"deepWork"}"#).unwrap();
        assert!(!settings.is_enabled);
        assert_eq!(settings.mode, Mode::DeepWork);
        assert_eq!(settings.work_duration, 1500);

        let json = serde_json::to_value(Settings { mode: Mode::Creative, ..Settings::default() }).unwrap();
        assert_eq!(json["mode"], "creative");
        assert_eq!(json["isEnabled"], true);
    }
}
