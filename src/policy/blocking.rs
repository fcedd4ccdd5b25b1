//! Mode-dependent blocking of distracting sites
//!
//! Deep-work mode redirects every distracting tab to the block page. Creative
//! mode tolerates a grace period per hostname before redirecting, then waits
//! out a cool-down measured from the redirect before the grace clock restarts.
//! Normal mode never blocks.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::time::Instant;
use tracing::{debug, info};

use super::classify::distracting_host;
use crate::{
    services::Tab,
    state::{AppState, Mode},
};

pub const GRACE_PERIOD: Duration = Duration::from_secs(15 * 60);
pub const COOL_DOWN: Duration = Duration::from_secs(10 * 60);
/// Hostnames not seen for this long are forgotten
pub const HISTORY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Visit {
    grace_start: Instant,
    /// Set at redirect time; no blocking and no new grace until it passes
    cool_down_until: Option<Instant>,
    last_seen: Instant,
}

/// Grace-period bookkeeping per hostname, in memory only
#[derive(Debug, Default)]
struct VisitHistory {
    visits: HashMap<String, Visit>,
}

impl VisitHistory {
    fn len(&self) -> usize {
        self.visits.len()
    }

    fn clear(&mut self) {
        self.visits.clear();
    }

    fn evict_stale(&mut self, now: Instant) {
        let before = self.visits.len();
        self.visits
            .retain(|_, visit| now.saturating_duration_since(visit.last_seen) < HISTORY_TTL);
        if self.visits.len() != before {
            debug!("Evicted {} stale visit entries", before - self.visits.len());
        }
    }

    /// Record a creative-mode visit at `now`; returns whether to redirect
    fn visit(&mut self, host: &str, now: Instant) -> bool {
        self.evict_stale(now);
        let visit = self.visits.entry(host.to_string()).or_insert(Visit {
            grace_start: now,
            cool_down_until: None,
            last_seen: now,
        });
        visit.last_seen = now;

        if let Some(until) = visit.cool_down_until {
            if now < until {
                return false;
            }
            visit.cool_down_until = None;
        }

        if now.saturating_duration_since(visit.grace_start) > GRACE_PERIOD {
            visit.grace_start = now;
            visit.cool_down_until = Some(now + COOL_DOWN);
            return true;
        }
        false
    }
}

pub struct BlockingPolicy {
    state: Arc<AppState>,
    history: Mutex<VisitHistory>,
}

impl BlockingPolicy {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            history: Mutex::new(VisitHistory::default()),
        }
    }

    /// React to a tab navigating to a new URL
    pub fn on_navigation(&self, tab: &Tab) {
        let settings = self.state.settings();
        if !settings.is_enabled {
            return;
        }
        let Some(url) = tab.url.as_deref() else {
            return;
        };
        let Some(host) = distracting_host(url) else {
            return;
        };

        match settings.mode {
            Mode::DeepWork => {
                info!("Deep work: blocking {} in tab {}", host, tab.id);
                self.redirect(tab);
            }
            Mode::Creative => {
                let block = match self.history.lock() {
                    Ok(mut history) => history.visit(&host, Instant::now()),
                    Err(_) => false,
                };
                if block {
                    info!("Creative mode: grace period over for {}, blocking tab {}", host, tab.id);
                    self.redirect(tab);
                } else {
                    debug!("Creative mode: {} still allowed", host);
                }
            }
            Mode::Normal => {}
        }
    }

    /// Apply a freshly activated mode; returns the number of tabs redirected
    pub fn on_mode_activated(&self, mode: Mode) -> usize {
        if let Ok(mut history) = self.history.lock() {
            history.clear();
        }
        info!("Mode activated: {}", mode.as_str());

        if mode != Mode::DeepWork {
            return 0;
        }
        let mut blocked = 0;
        for tab in self.state.tabs.tabs() {
            let distracting = tab.url.as_deref().and_then(distracting_host).is_some();
            if distracting && self.redirect(&tab) {
                blocked += 1;
            }
        }
        info!("Deep work sweep blocked {} open tabs", blocked);
        blocked
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }

    fn redirect(&self, tab: &Tab) -> bool {
        match self.state.tabs.redirect(tab.id, &self.state.block_page) {
            Ok(()) => true,
            Err(e) => {
                debug!("Redirect of tab {} skipped: {}", tab.id, e);
                false
            }
        }
    }
}
