//! Crate error type

use thiserror::Error;

use crate::services::tabs::TabId;

/// Errors raised inside the background process.
///
/// None of these are fatal: callers log them and keep running.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a store file failed
    #[error("storage I/O error: {0}")]
    StorageIo(#[from] std::io::Error),

    /// A store value could not be encoded or decoded
    #[error("storage serialization error: {0}")]
    StorageFormat(#[from] serde_json::Error),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("URL '{0}' has no host")]
    MissingHost(String),

    /// The tab closed before we could act on it
    #[error("tab {0} no longer exists")]
    TabNotFound(TabId),

    #[error("failed to lock {0}")]
    LockPoisoned(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
