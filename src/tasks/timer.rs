//! Work/break countdown engine
//!
//! The engine owns the only live copy of [`TimerState`]. While running, a
//! spawned tick loop decrements it once per second. Every mutation is
//! persisted to the local tier before it is broadcast, and every mutation
//! refreshes the badge.
//!
//! Each tick loop is tagged with an epoch. Start, pause and reset bump the
//! epoch under the state lock, so a loop that has been cancelled can never
//! touch the state again even if it was mid-tick when aborted.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::{
    error::{Error, Result},
    protocol::Event,
    services::store::{self, TIMER_STATE_KEY},
    state::{AppState, TimerState},
};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct TimerSlot {
    state: TimerState,
    epoch: u64,
}

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    Counting,
    PhaseComplete,
    /// The loop was superseded or the timer is not running
    Stale,
}

pub struct TimerEngine {
    app: Arc<AppState>,
    slot: Arc<Mutex<TimerSlot>>,
    tick_task: Mutex<Option<JoinHandle<()>>>,
}

impl TimerEngine {
    /// Load the persisted timer and resume counting if it was running.
    ///
    /// Time spent while the process was down is not subtracted.
    pub fn restore(app: Arc<AppState>) -> Self {
        let state = store::load::<TimerState>(app.stores.local.as_ref(), TIMER_STATE_KEY)
            .unwrap_or_default();
        let running = state.is_running;
        app.set_badge(state.time_left);

        let engine = Self {
            app,
            slot: Arc::new(Mutex::new(TimerSlot { state, epoch: 0 })),
            tick_task: Mutex::new(None),
        };
        if running {
            info!("Resuming running timer from persisted state");
            engine.spawn_tick_loop(0);
        }
        engine
    }

    pub fn state(&self) -> Result<TimerState> {
        self.slot
            .lock()
            .map(|slot| slot.state.clone())
            .map_err(|_| Error::LockPoisoned("timer state"))
    }

    /// Replace the state wholesale and start counting down
    pub fn start(&self, time_left: u64, is_break: bool, work_duration: u64, break_duration: u64) -> Result<()> {
        info!(
            "Starting {} timer: {}s left (work={}s, break={}s)",
            if is_break { "break" } else { "work" },
            time_left,
            work_duration,
            break_duration
        );
        self.cancel_tick_loop();
        let epoch = self.mutate(|state| {
            *state = TimerState {
                time_left,
                is_running: true,
                is_break,
                work_duration,
                break_duration,
            };
        })?;
        self.spawn_tick_loop(epoch);
        Ok(())
    }

    /// Stop counting, keeping the remaining time
    pub fn pause(&self) -> Result<()> {
        info!("Pausing timer");
        self.cancel_tick_loop();
        self.mutate(|state| state.is_running = false)?;
        Ok(())
    }

    /// Stop counting and return to an idle work phase
    pub fn reset(&self, time_left: u64, work_duration: u64, break_duration: u64) -> Result<()> {
        info!("Resetting timer to {}s", time_left);
        self.cancel_tick_loop();
        self.mutate(|state| {
            *state = TimerState {
                time_left,
                is_running: false,
                is_break: false,
                work_duration,
                break_duration,
            };
        })?;
        Ok(())
    }

    /// Write the current state to the store, used on shutdown
    pub fn flush(&self) -> Result<()> {
        let state = self.state()?;
        store::save(self.app.stores.local.as_ref(), TIMER_STATE_KEY, &state)
    }

    /// Apply `update` as a new epoch, persist, then broadcast
    fn mutate<F>(&self, update: F) -> Result<u64>
    where
        F: FnOnce(&mut TimerState),
    {
        let mut slot = self.slot.lock().map_err(|_| Error::LockPoisoned("timer state"))?;
        slot.epoch += 1;
        update(&mut slot.state);
        persist(&self.app, &slot.state);
        let (snapshot, epoch) = (slot.state.clone(), slot.epoch);
        drop(slot);

        announce(&self.app, snapshot, false);
        Ok(epoch)
    }

    fn cancel_tick_loop(&self) {
        if let Ok(mut task) = self.tick_task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
                debug!("Cancelled tick loop");
            }
        }
    }

    fn spawn_tick_loop(&self, epoch: u64) {
        let app = Arc::clone(&self.app);
        let slot = Arc::clone(&self.slot);
        let handle = tokio::spawn(async move {
            tick_loop(app, slot, epoch).await;
        });

        match self.tick_task.lock() {
            Ok(mut task) => {
                if let Some(previous) = task.replace(handle) {
                    previous.abort();
                }
            }
            Err(_) => error!("Failed to record tick loop handle"),
        }
    }
}

async fn tick_loop(app: Arc<AppState>, slot: Arc<Mutex<TimerSlot>>, epoch: u64) {
    debug!("Tick loop {} started", epoch);
    let mut interval = time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match tick(&app, &slot, epoch) {
            Tick::Counting => {}
            Tick::PhaseComplete | Tick::Stale => break,
        }
    }
    debug!("Tick loop {} finished", epoch);
}

fn tick(app: &AppState, slot: &Mutex<TimerSlot>, epoch: u64) -> Tick {
    let mut slot = match slot.lock() {
        Ok(slot) => slot,
        Err(_) => {
            error!("Timer state lock poisoned, stopping tick loop");
            return Tick::Stale;
        }
    };
    if slot.epoch != epoch || !slot.state.is_running {
        return Tick::Stale;
    }

    slot.state.time_left = slot.state.time_left.saturating_sub(1);
    if slot.state.time_left > 0 {
        persist(app, &slot.state);
        let snapshot = slot.state.clone();
        drop(slot);
        announce(app, snapshot, false);
        return Tick::Counting;
    }

    slot.state.complete_phase();
    persist(app, &slot.state);
    let snapshot = slot.state.clone();
    drop(slot);

    info!(
        "Phase complete, next phase: {} ({}s)",
        if snapshot.is_break { "break" } else { "work" },
        snapshot.time_left
    );
    let notify = app.settings().is_enabled;
    if notify {
        let (title, message) = if snapshot.is_break {
            ("Work Session Complete!", "Time for a break!")
        } else {
            ("Break Time Over!", "Time to get back to work!")
        };
        app.notifier.notify(title, message);
    }
    announce(app, snapshot, notify);
    Tick::PhaseComplete
}

fn persist(app: &AppState, state: &TimerState) {
    if let Err(e) = store::save(app.stores.local.as_ref(), TIMER_STATE_KEY, state) {
        warn!("Failed to persist timer state: {}", e);
    }
}

fn announce(app: &AppState, state: TimerState, show_notification: bool) {
    app.set_badge(state.time_left);
    app.bus.publish(Event::TimerUpdate {
        state,
        show_notification,
    });
}
