//! Persistent key-value store with change notification
//!
//! Two tiers are used: `sync` holds the user settings, `local` holds the
//! timer state and the per-site counters. Each tier is a flat JSON object,
//! either kept in memory or mirrored to one file on every write.

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use fs_err as fs;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

pub const SETTINGS_KEY: &str = "settings";
pub const TIMER_STATE_KEY: &str = "timerState";
pub const SITE_TIMERS_KEY: &str = "siteTimers";

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// One key changing value, as delivered to subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

pub trait Store: Send + Sync {
    /// Fetch the requested keys; absent keys are left out of the result
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>>;

    /// Write every entry of `items`.
    ///
    /// The in-memory view is updated even when mirroring to disk fails.
    fn set(&self, items: Map<String, Value>) -> Result<()>;

    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

/// JSON object store, optionally mirrored to a file
#[derive(Debug)]
pub struct JsonStore {
    name: &'static str,
    path: Option<PathBuf>,
    values: Mutex<Map<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
}

impl JsonStore {
    pub fn in_memory(name: &'static str) -> Self {
        Self::with_values(name, None, Map::new())
    }

    /// Open the store at `path`, starting empty if the file is missing or unreadable
    pub fn open(name: &'static str, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match read_object(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!("Starting {} store empty: {}", name, e);
                Map::new()
            }
        };
        info!("Opened {} store at {} ({} keys)", name, path.display(), values.len());
        Self::with_values(name, Some(path), values)
    }

    fn with_values(name: &'static str, path: Option<PathBuf>, values: Map<String, Value>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            name,
            path,
            values: Mutex::new(values),
            changes,
        }
    }

    fn flush(&self, values: &Map<String, Value>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn read_object(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

impl Store for JsonStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let values = self.values.lock().map_err(|_| Error::LockPoisoned("store"))?;
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    fn set(&self, items: Map<String, Value>) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| Error::LockPoisoned("store"))?;

        let mut changed = Vec::new();
        for (key, new_value) in items {
            let old_value = values.insert(key.clone(), new_value.clone());
            if old_value.as_ref() != Some(&new_value) {
                changed.push(StorageChange {
                    key,
                    old_value,
                    new_value: Some(new_value),
                });
            }
        }
        let flushed = self.flush(&values);
        drop(values);

        for change in changed {
            if self.changes.send(change).is_err() {
                debug!("No subscribers for {} store changes", self.name);
            }
        }
        flushed
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}

/// The two storage tiers used by the background process
pub struct Stores {
    pub sync: Box<dyn Store>,
    pub local: Box<dyn Store>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            sync: Box::new(JsonStore::in_memory("sync")),
            local: Box::new(JsonStore::in_memory("local")),
        }
    }

    /// Open file-backed tiers under `dir`, creating it if needed
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            sync: Box::new(JsonStore::open("sync", dir.join("sync.json"))),
            local: Box::new(JsonStore::open("local", dir.join("local.json"))),
        })
    }
}

/// Read a typed value, returning `None` when it is missing or has the wrong shape
pub fn load<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Option<T> {
    let value = match store.get(&[key]) {
        Ok(mut values) => values.remove(key)?,
        Err(e) => {
            warn!("Failed to read '{}': {}", key, e);
            return None;
        }
    };
    decode(key, value)
}

pub fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!("Ignoring malformed '{}' value: {}", key, e);
            None
        }
    }
}

pub fn save<T: Serialize>(store: &dyn Store, key: &str, value: &T) -> Result<()> {
    let mut items = Map::new();
    items.insert(key.to_string(), serde_json::to_value(value)?);
    store.set(items)
}
