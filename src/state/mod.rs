//! State management module
//!
//! Data types owned by the background process and the shared context that
//! carries them.

pub mod app_state;
pub mod settings;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use settings::{Mode, Settings};
pub use timer_state::TimerState;
