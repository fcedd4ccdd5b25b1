//! External collaborators module
//!
//! Storage, notifications and the browser tab host the core depends on.

pub mod notifier;
pub mod store;
pub mod tabs;

// Re-export main types
pub use notifier::{BusNotifier, Notifier};
pub use store::{JsonStore, StorageChange, Store, Stores};
pub use tabs::{Tab, TabHost, TabId, TabRegistry};
