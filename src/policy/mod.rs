//! Site classification and blocking policy

pub mod blocking;
pub mod classify;

pub use blocking::BlockingPolicy;
pub use classify::{classify, classify_host, distracting_host, Category};
