//! crates/verbosity/src/error.rs
//!
//! Error types for destination management.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for verbosity operations.
pub type Result<T> = std::result::Result<T, VerbosityError>;

/// Errors raised while acquiring or releasing an owned log file.
#[derive(Debug, Error)]
pub enum VerbosityError {
    /// The log file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The owned log file could not be flushed and closed.
    #[error("cannot close {}: {source}", path.display())]
    Close {
        /// Absolute path of the owned file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

impl VerbosityError {
    /// Returns the path the failed operation was acting on.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Open { path, .. } | Self::Close { path, .. } => path,
        }
    }
}
