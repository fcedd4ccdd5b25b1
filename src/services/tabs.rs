//! Browser tab registry reported by the host

use std::{
    collections::HashMap,
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    protocol::{Event, EventBus},
};

pub type TabId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub window_id: Option<u32>,
}

impl Tab {
    pub fn new(id: TabId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: Some(url.into()),
            window_id: None,
        }
    }
}

/// Access to the open tabs of every browser window
pub trait TabHost: Send + Sync {
    /// All known tabs across all windows
    fn tabs(&self) -> Vec<Tab>;

    fn get(&self, id: TabId) -> Option<Tab>;

    /// Navigate `id` to `url`; fails if the tab is gone
    fn redirect(&self, id: TabId, url: &str) -> Result<()>;
}

/// Tab host fed by the browser's tab events.
///
/// Redirects update the registry and are forwarded to the browser as
/// `REDIRECT_TAB` broadcasts.
#[derive(Debug)]
pub struct TabRegistry {
    tabs: Mutex<HashMap<TabId, Tab>>,
    bus: EventBus,
}

impl TabRegistry {
    pub fn new(bus: EventBus) -> Self {
        Self {
            tabs: Mutex::new(HashMap::new()),
            bus,
        }
    }

    /// Record a tab's latest state, keeping its URL if the update has none
    pub fn upsert(&self, mut tab: Tab) -> Tab {
        let Ok(mut tabs) = self.tabs.lock() else {
            return tab;
        };
        if let Some(previous) = tabs.get(&tab.id) {
            if tab.url.is_none() {
                tab.url = previous.url.clone();
            }
            if tab.window_id.is_none() {
                tab.window_id = previous.window_id;
            }
        }
        tabs.insert(tab.id, tab.clone());
        tab
    }

    pub fn remove(&self, id: TabId) -> Option<Tab> {
        self.tabs.lock().ok()?.remove(&id)
    }
}

impl TabHost for TabRegistry {
    fn tabs(&self) -> Vec<Tab> {
        let Ok(tabs) = self.tabs.lock() else {
            return Vec::new();
        };
        let mut all: Vec<Tab> = tabs.values().cloned().collect();
        all.sort_by_key(|tab| tab.id);
        all
    }

    fn get(&self, id: TabId) -> Option<Tab> {
        self.tabs.lock().ok()?.get(&id).cloned()
    }

    fn redirect(&self, id: TabId, url: &str) -> Result<()> {
        {
            let mut tabs = self.tabs.lock().map_err(|_| Error::LockPoisoned("tabs"))?;
            let tab = tabs.get_mut(&id).ok_or(Error::TabNotFound(id))?;
            tab.url = Some(url.to_string());
        }
        info!("Redirecting tab {} to {}", id, url);
        self.bus.publish(Event::RedirectTab {
            tab_id: id,
            url: url.to_string(),
        });
        debug!("Redirect for tab {} published", id);
        Ok(())
    }
}
