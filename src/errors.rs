//! Error hierarchy of the wireless signal core.
//!
//! Recoverable faults (malformed persisted entries, failed channel-file
//! writes) are logged and swallowed at their call sites; no error from this
//! crate may abort the host's event loop.

use std::path::PathBuf;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Receiver store failures (IO, serialization)
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// The channel file exists but its top-level value is not an array.
    #[error("channel file {path} does not hold a JSON array")]
    NotAnArray { path: PathBuf },
}
