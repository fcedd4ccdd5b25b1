//! Process-wide context shared by every component

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use super::{timer_state::format_countdown, Settings};
use crate::{
    protocol::EventBus,
    services::{
        store::{self, SETTINGS_KEY},
        Notifier, Stores, TabHost,
    },
};

/// Context created once at startup and alive for the whole process.
///
/// Holds the settings and the handles to every external collaborator.
/// Component-owned state (timer, visit history, site counters) lives in the
/// components themselves, which receive this context explicitly.
pub struct AppState {
    settings: Mutex<Settings>,
    pub stores: Stores,
    pub bus: EventBus,
    pub tabs: Arc<dyn TabHost>,
    pub notifier: Arc<dyn Notifier>,
    /// URL every blocked tab is sent to
    pub block_page: String,
    /// Countdown indicator visible without any UI open
    badge_tx: watch::Sender<String>,
    pub start_time: Instant,
    last_command: Mutex<Option<String>>,
    last_command_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Create the context, restoring settings from the sync tier or falling back to defaults
    pub fn new(
        stores: Stores,
        bus: EventBus,
        tabs: Arc<dyn TabHost>,
        notifier: Arc<dyn Notifier>,
        block_page: String,
    ) -> Self {
        let settings = match store::load::<Settings>(stores.sync.as_ref(), SETTINGS_KEY) {
            Some(settings) => {
                info!("Restored settings: enabled={}, mode={}", settings.is_enabled, settings.mode.as_str());
                settings
            }
            None => Settings::default(),
        };
        let (badge_tx, _) = watch::channel(String::new());

        Self {
            settings: Mutex::new(settings),
            stores,
            bus,
            tabs,
            notifier,
            block_page,
            badge_tx,
            start_time: Instant::now(),
            last_command: Mutex::new(None),
            last_command_time: Mutex::new(None),
        }
    }

    /// Snapshot of the current settings
    pub fn settings(&self) -> Settings {
        match self.settings.lock() {
            Ok(settings) => settings.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the settings wholesale and persist them; returns the previous value
    pub fn replace_settings(&self, settings: Settings) -> Settings {
        let previous = match self.settings.lock() {
            Ok(mut current) => std::mem::replace(&mut *current, settings.clone()),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), settings.clone()),
        };

        if let Err(e) = store::save(self.stores.sync.as_ref(), SETTINGS_KEY, &settings) {
            warn!("Failed to persist settings: {}", e);
        }
        previous
    }

    pub fn set_badge(&self, seconds: u64) {
        self.badge_tx.send_replace(format_countdown(seconds));
    }

    pub fn badge(&self) -> String {
        self.badge_tx.borrow().clone()
    }

    /// Remember the last command received from a UI context
    pub fn record_command(&self, name: &str) {
        if let Ok(mut last_command) = self.last_command.lock() {
            *last_command = Some(name.to_string());
        }
        if let Ok(mut last_time) = self.last_command_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    pub fn get_last_command(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_command = self.last_command.lock().ok().and_then(|c| c.clone());
        let last_command_time = self.last_command_time.lock().ok().and_then(|t| *t);
        (last_command, last_command_time)
    }

    /// Calculate process uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{state::Mode, testing::TestHarness};

    #[test]
    fn test_settings_restored_from_sync_tier() {
        let stores = Stores::in_memory();
        let saved = Settings { mode: Mode::Creative, is_enabled: false, ..Settings::default() };
        store::save(stores.sync.as_ref(), SETTINGS_KEY, &saved).unwrap();

        let harness = TestHarness::with_stores(stores);
        assert_eq!(harness.state.settings(), saved);
    }

    #[test]
    fn test_replace_settings_persists() {
        let harness = TestHarness::new();
        let next = Settings { mode: Mode::DeepWork, ..Settings::default() };
        let previous = harness.state.replace_settings(next.clone());

        assert_eq!(previous, Settings::default());
        let stored: Option<Settings> = store::load(harness.state.stores.sync.as_ref(), SETTINGS_KEY);
        assert_eq!(stored, Some(next));
    }

    #[test]
    fn test_badge_text() {
        let harness = TestHarness::new();
        harness.state.set_badge(299);
        assert_eq!(harness.state.badge(), "4:59");
    }
}
