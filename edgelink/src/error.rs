//! Error types for edgelink operations.

use std::io;
use std::path::PathBuf;

/// Alias for `Result<T, edgelink::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by session, export/import, and bot operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A message record could not be built or decoded.
    #[error(transparent)]
    Proto(#[from] edgelink_proto::Error),

    /// An artifact location could not be resolved, read, or written.
    #[error("storage unavailable at {path}: {source}")]
    Storage {
        /// The artifact or folder involved.
        path: PathBuf,
        /// The underlying I/O failure.
        source: io::Error,
    },

    /// The engine rejected an otherwise well-formed request.
    #[error("engine error: {0}")]
    Engine(String),

    /// `start` was called while the bot process is running.
    #[error("bot process is already running")]
    AlreadyRunning,

    /// `start` was called on a controller whose cycle already ended.
    /// A new cycle requires a new controller.
    #[error("bot lifecycle is over; create a new controller")]
    LifecycleOver,
}

impl Error {
    /// Wraps an I/O failure with the artifact path it concerns.
    pub(crate) fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Wraps a JSON syntax failure the same way the engine treats any
    /// unreadable artifact.
    pub(crate) fn invalid_format(path: impl Into<PathBuf>, err: serde_json::Error) -> Self {
        Self::storage(path, io::Error::new(io::ErrorKind::InvalidData, err))
    }
}
