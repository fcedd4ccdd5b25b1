//! Settings change feed background task

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::{
    background::Background,
    services::{
        store::{self, SETTINGS_KEY},
        StorageChange,
    },
    state::Settings,
};

/// Apply settings written to the sync tier by another context.
///
/// Writes made by the background process itself match the in-memory
/// settings and are skipped, as are changes already overwritten in the store.
pub async fn settings_watch_task(
    background: Arc<Background>,
    mut changes: broadcast::Receiver<StorageChange>,
) {
    info!("Starting settings watch task");

    loop {
        match changes.recv().await {
            Ok(change) if change.key == SETTINGS_KEY => {
                let Some(settings) = change
                    .new_value
                    .and_then(|value| store::decode::<Settings>(SETTINGS_KEY, value))
                else {
                    continue;
                };
                // Superseded by a later write; that write has its own event
                let stored = store::load::<Settings>(background.state.stores.sync.as_ref(), SETTINGS_KEY);
                if stored.as_ref() != Some(&settings) {
                    debug!("Skipping stale settings change");
                    continue;
                }
                if settings == background.state.settings() {
                    debug!("Settings change already applied");
                    continue;
                }
                info!("Applying settings written by another context");
                background.apply_settings(settings);
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!("Settings watch lagged, skipped {} changes", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Settings change feed closed");
                break;
            }
        }
    }
}
