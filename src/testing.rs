//! Shared fixtures for unit tests

use std::sync::{Arc, Mutex};

use crate::{
    protocol::EventBus,
    services::{store, Notifier, Stores, TabRegistry},
    state::{AppState, Settings},
};

pub const BLOCK_PAGE: &str = "chrome-extension://focus-flow/blocked.html";

/// Notifier that keeps every alert for inspection
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.sent.lock().unwrap().push((title.to_string(), message.to_string()));
    }
}

pub struct TestHarness {
    pub state: Arc<AppState>,
    pub tabs: Arc<TabRegistry>,
    pub notifier: Arc<RecordingNotifier>,
    pub bus: EventBus,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_stores(Stores::in_memory())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let stores = Stores::in_memory();
        store::save(stores.sync.as_ref(), store::SETTINGS_KEY, &settings).unwrap();
        Self::with_stores(stores)
    }

    pub fn with_stores(stores: Stores) -> Self {
        let bus = EventBus::new();
        let tabs = Arc::new(TabRegistry::new(bus.clone()));
        let notifier = Arc::new(RecordingNotifier::default());
        let state = Arc::new(AppState::new(
            stores,
            bus.clone(),
            tabs.clone(),
            notifier.clone(),
            BLOCK_PAGE.to_string(),
        ));
        Self {
            state,
            tabs,
            notifier,
            bus,
        }
    }

    pub fn tab_url(&self, id: u32) -> Option<String> {
        use crate::services::TabHost;
        self.tabs.get(id).and_then(|tab| tab.url)
    }
}
