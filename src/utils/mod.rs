//! Process plumbing shared by the binary and the library.

pub mod signals;

pub use signals::shutdown_signal;
