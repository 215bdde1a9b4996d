//! Error types shared by every stage of a batch run.
//!
//! The variants follow the life of a run: startup failures abort before any
//! worker exists, load and job failures only cost the one file involved, and
//! spawn failures shrink the pool without stopping it.

use std::path::PathBuf;

/// Common error type for wavforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The run could not start (unreadable directory, bad configuration).
    #[error("Startup error: {0}")]
    Startup(String),

    /// One discovered file could not be added to the queue.
    #[error("Failed to queue {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    /// A worker thread could not be started.
    #[error("Failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        source: std::io::Error,
    },

    /// Converting one file failed.
    #[error("Failed to encode {}: {reason}", path.display())]
    Job { path: PathBuf, reason: String },

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new Startup error.
    pub fn startup<S: Into<String>>(msg: S) -> Self {
        Self::Startup(msg.into())
    }

    /// Create a new Load error for `path`.
    pub fn load<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Spawn error for worker `worker`.
    pub fn spawn(worker: usize, source: std::io::Error) -> Self {
        Self::Spawn { worker, source }
    }

    /// Create a new Job error for `path`.
    pub fn job<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::Job {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error ends the run instead of costing a single file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Startup(_))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
