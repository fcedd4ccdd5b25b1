//! Message protocol between the background process and UI contexts
//!
//! Commands are answered through [`dispatch`]; updates are pushed through
//! the [`EventBus`] to whoever is listening.

pub mod bus;
pub mod dispatch;
pub mod messages;

pub use bus::EventBus;
pub use dispatch::dispatch;
pub use messages::{Event, Request, Response};
