//! Per-site time tracking for the focused tab

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use rand::seq::SliceRandom;
use tokio::{
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    policy::distracting_host,
    services::{
        store::{self, SITE_TIMERS_KEY},
        Tab, TabId,
    },
    state::{AppState, Mode},
};

pub const COUNT_INTERVAL: Duration = Duration::from_secs(1);
pub const DAILY_RESET_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);
/// A reminder is sent every time a site's counter reaches a multiple of this
pub const REMINDER_EVERY_SECONDS: u64 = 10;

/// Accumulated seconds per hostname
pub type SiteTimers = BTreeMap<String, u64>;

struct Counting {
    hostname: String,
    handle: JoinHandle<()>,
}

/// The focused tab and, if it is on a distracting site, its counter
struct ActiveTab {
    tab_id: TabId,
    counting: Option<Counting>,
}

pub struct SiteTimeTracker {
    app: Arc<AppState>,
    timers: Arc<Mutex<SiteTimers>>,
    active: Mutex<Option<ActiveTab>>,
}

impl SiteTimeTracker {
    pub fn restore(app: Arc<AppState>) -> Self {
        let timers = store::load::<SiteTimers>(app.stores.local.as_ref(), SITE_TIMERS_KEY)
            .unwrap_or_default();
        debug!("Restored site timers for {} hosts", timers.len());
        Self {
            app,
            timers: Arc::new(Mutex::new(timers)),
            active: Mutex::new(None),
        }
    }

    /// Switch tracking to `tab`, stopping any previous counter first
    pub fn on_active_tab_changed(&self, tab: &Tab) {
        let Ok(mut active) = self.active.lock() else {
            warn!("Active tab lock poisoned, ignoring tab change");
            return;
        };
        if let Some(Counting { hostname, handle }) = active.take().and_then(|a| a.counting) {
            handle.abort();
            debug!("Stopped counting {}", hostname);
        }

        let counting = tab
            .url
            .as_deref()
            .and_then(distracting_host)
            .map(|hostname| self.start_counting(hostname));
        *active = Some(ActiveTab {
            tab_id: tab.id,
            counting,
        });
    }

    pub fn on_tab_removed(&self, tab_id: TabId) {
        let Ok(mut active) = self.active.lock() else {
            return;
        };
        if active.as_ref().map(|a| a.tab_id) != Some(tab_id) {
            return;
        }
        if let Some(counting) = active.take().and_then(|a| a.counting) {
            counting.handle.abort();
            debug!("Tracked tab {} closed, stopped counting {}", tab_id, counting.hostname);
        }
    }

    pub fn active_tab(&self) -> Option<TabId> {
        self.active.lock().ok()?.as_ref().map(|a| a.tab_id)
    }

    /// Hostname currently being counted, if any
    pub fn counting_host(&self) -> Option<String> {
        let active = self.active.lock().ok()?;
        active.as_ref()?.counting.as_ref().map(|c| c.hostname.clone())
    }

    pub fn site_timers(&self) -> SiteTimers {
        self.timers.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Clear every counter and persist the empty map
    pub fn reset_daily(&self) {
        reset_timers(&self.app, &self.timers);
    }

    /// Spawn the recurring 24-hour reset
    pub fn spawn_daily_reset(&self) -> JoinHandle<()> {
        let app = Arc::clone(&self.app);
        let timers = Arc::clone(&self.timers);
        tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + DAILY_RESET_PERIOD, DAILY_RESET_PERIOD);
            loop {
                interval.tick().await;
                reset_timers(&app, &timers);
            }
        })
    }

    fn start_counting(&self, hostname: String) -> Counting {
        if let Ok(mut timers) = self.timers.lock() {
            timers.entry(hostname.clone()).or_insert(0);
        }
        debug!("Counting time on {}", hostname);

        let app = Arc::clone(&self.app);
        let timers = Arc::clone(&self.timers);
        let host = hostname.clone();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + COUNT_INTERVAL, COUNT_INTERVAL);
            loop {
                interval.tick().await;
                record_second(&app, &timers, &host);
            }
        });
        Counting { hostname, handle }
    }
}

fn record_second(app: &AppState, timers: &Mutex<SiteTimers>, hostname: &str) {
    let seconds = {
        let Ok(mut timers) = timers.lock() else {
            return;
        };
        let seconds = timers.entry(hostname.to_string()).or_insert(0);
        *seconds += 1;
        let seconds = *seconds;
        if let Err(e) = store::save(app.stores.local.as_ref(), SITE_TIMERS_KEY, &*timers) {
            warn!("Failed to persist site timers: {}", e);
        }
        seconds
    };

    if seconds % REMINDER_EVERY_SECONDS == 0 {
        let settings = app.settings();
        if settings.is_enabled && settings.mode == Mode::Normal {
            app.notifier.notify("Time Check ⏰", &motivational_message(hostname));
        }
    }
}

fn reset_timers(app: &AppState, timers: &Mutex<SiteTimers>) {
    let Ok(mut timers) = timers.lock() else {
        return;
    };
    timers.clear();
    if let Err(e) = store::save(app.stores.local.as_ref(), SITE_TIMERS_KEY, &*timers) {
        warn!("Failed to persist site timer reset: {}", e);
    }
    info!("Daily site timer reset");
}

fn motivational_message(site: &str) -> String {
    let messages = [
        format!("Taking a break from {} might help you stay focused!", site),
        format!("You've been on {} for a while. Ready to get back to work?", site),
        "Quick reminder: Your goals are waiting for you!".to_string(),
        "Time flies when we're distracted. Let's refocus!".to_string(),
    ];
    messages
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_default()
}
