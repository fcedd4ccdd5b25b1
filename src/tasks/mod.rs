//! Background tasks module
//!
//! Long-running engines of the background process: the countdown, the
//! per-site tracker and the settings change watcher.

pub mod settings_watch;
pub mod site_tracker;
pub mod timer;

// Re-export main types
pub use settings_watch::settings_watch_task;
pub use site_tracker::{SiteTimeTracker, SiteTimers};
pub use timer::TimerEngine;
