//! The background process: owner of every piece of mutable state

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    policy::BlockingPolicy,
    services::{Tab, TabHost, TabId, TabRegistry},
    state::{AppState, Settings},
    tasks::{settings_watch_task, SiteTimeTracker, TimerEngine},
};

/// Tab lifecycle events reported by the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEvent {
    /// A tab changed; `url` is set when it navigated
    Updated(Tab),
    Activated(TabId),
    Removed(TabId),
}

pub struct Background {
    pub state: Arc<AppState>,
    pub timer: TimerEngine,
    pub blocking: BlockingPolicy,
    pub tracker: SiteTimeTracker,
    registry: Arc<TabRegistry>,
}

impl Background {
    /// Build every component from the context and start the background tasks.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(state: Arc<AppState>, registry: Arc<TabRegistry>) -> Arc<Self> {
        let background = Arc::new(Self::new(state, registry));

        let mode = background.state.settings().mode;
        background.blocking.on_mode_activated(mode);
        background.tracker.spawn_daily_reset();
        let changes = background.state.stores.sync.subscribe();
        tokio::spawn(settings_watch_task(Arc::clone(&background), changes));

        info!("Background process started in {} mode", mode.as_str());
        background
    }

    fn new(state: Arc<AppState>, registry: Arc<TabRegistry>) -> Self {
        Self {
            timer: TimerEngine::restore(Arc::clone(&state)),
            blocking: BlockingPolicy::new(Arc::clone(&state)),
            tracker: SiteTimeTracker::restore(Arc::clone(&state)),
            state,
            registry,
        }
    }

    /// Replace the settings and run the mode activation side effect
    pub fn apply_settings(&self, settings: Settings) {
        info!(
            "Applying settings: enabled={}, mode={}",
            settings.is_enabled,
            settings.mode.as_str()
        );
        let mode = settings.mode;
        self.state.replace_settings(settings);
        self.blocking.on_mode_activated(mode);
    }

    pub fn handle_tab_event(&self, event: TabEvent) {
        debug!("Tab event: {:?}", event);
        match event {
            TabEvent::Updated(update) => {
                let navigated = update.url.is_some();
                let tab = self.registry.upsert(update);
                if !navigated {
                    return;
                }
                self.blocking.on_navigation(&tab);

                if self.tracker.active_tab() == Some(tab.id) {
                    // Re-read: the policy may just have redirected this tab
                    let current = self.registry.get(tab.id).unwrap_or(tab);
                    self.tracker.on_active_tab_changed(&current);
                }
            }
            TabEvent::Activated(tab_id) => {
                let tab = self.registry.get(tab_id).unwrap_or_else(|| {
                    warn!("Activated tab {} was never reported", tab_id);
                    Tab {
                        id: tab_id,
                        url: None,
                        window_id: None,
                    }
                });
                self.tracker.on_active_tab_changed(&tab);
            }
            TabEvent::Removed(tab_id) => {
                self.registry.remove(tab_id);
                self.tracker.on_tab_removed(tab_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::store::{self, SETTINGS_KEY},
        state::Mode,
        testing::{TestHarness, BLOCK_PAGE},
    };
    use std::time::Duration;

    fn start(harness: &TestHarness) -> Arc<Background> {
        Background::start(harness.state.clone(), harness.tabs.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_in_deep_work_sweeps_known_tabs() {
        let harness = TestHarness::with_settings(Settings { mode: Mode::DeepWork, ..Settings::default() });
        harness.tabs.upsert(Tab::new(1, "https://reddit.com"));
        harness.tabs.upsert(Tab::new(2, "https://notion.so"));

        let _background = start(&harness);
        assert_eq!(harness.tab_url(1).as_deref(), Some(BLOCK_PAGE));
        assert_eq!(harness.tab_url(2).as_deref(), Some("https://notion.so"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_in_tracked_tab_retargets_counter() {
        let harness = TestHarness::new();
        let background = start(&harness);

        background.handle_tab_event(TabEvent::Updated(Tab::new(1, "https://github.com")));
        background.handle_tab_event(TabEvent::Activated(1));
        assert_eq!(background.tracker.counting_host(), None);

        background.handle_tab_event(TabEvent::Updated(Tab::new(1, "https://youtube.com/watch")));
        assert_eq!(background.tracker.counting_host().as_deref(), Some("youtube.com"));

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        background.handle_tab_event(TabEvent::Removed(1));
        assert_eq!(background.tracker.site_timers().get("youtube.com"), Some(&2));
        assert_eq!(harness.tabs.get(1), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deep_work_redirect_stops_counting() {
        let harness = TestHarness::with_settings(Settings { mode: Mode::DeepWork, ..Settings::default() });
        let background = start(&harness);

        background.handle_tab_event(TabEvent::Updated(Tab::new(1, "https://github.com")));
        background.handle_tab_event(TabEvent::Activated(1));
        background.handle_tab_event(TabEvent::Updated(Tab::new(1, "https://instagram.com")));

        assert_eq!(harness.tab_url(1).as_deref(), Some(BLOCK_PAGE));
        assert_eq!(background.tracker.counting_host(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_settings_write_is_applied() {
        let harness = TestHarness::new();
        let background = start(&harness);
        harness.tabs.upsert(Tab::new(5, "https://discord.com/channels"));

        let next = Settings { mode: Mode::DeepWork, ..Settings::default() };
        store::save(harness.state.stores.sync.as_ref(), SETTINGS_KEY, &next).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(background.state.settings(), next);
        assert_eq!(harness.tab_url(5).as_deref(), Some(BLOCK_PAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_updates_settle_on_the_last() {
        let harness = TestHarness::new();
        let background = start(&harness);
        let mut writes = harness.state.stores.sync.subscribe();

        let creative = Settings { mode: Mode::Creative, ..Settings::default() };
        let deep_work = Settings { mode: Mode::DeepWork, ..Settings::default() };
        background.apply_settings(creative);
        background.apply_settings(deep_work.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(background.state.settings(), deep_work);
        let stored: Option<Settings> = store::load(harness.state.stores.sync.as_ref(), SETTINGS_KEY);
        assert_eq!(stored, Some(deep_work));
        let count = std::iter::from_fn(|| writes.try_recv().ok()).count();
        assert_eq!(count, 2);
    }
}
