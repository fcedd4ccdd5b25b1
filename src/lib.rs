//! Focus Flow - background service for a focus timer and distracting-site control
//!
//! This library owns the work/break timer, the blocking policy and the per-site
//! time tracker, and keeps short-lived UI contexts in sync with them through a
//! small message protocol.

pub mod api;
pub mod background;
pub mod config;
pub mod error;
pub mod policy;
pub mod protocol;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use api::create_router;
pub use background::{Background, TabEvent};
pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
