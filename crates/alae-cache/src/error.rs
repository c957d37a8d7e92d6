//! Cacher error types

use std::path::PathBuf;

use alae_formats::CacheFileError;
use thiserror::Error;

use crate::cacher::CacherState;

/// Error type for cache runs
///
/// Per-file decode failures never show up here: the scan logs them and
/// moves on. Everything in this enum terminates the run.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem operation failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The prior cache file cannot be trusted
    #[error("cache file {path} is corrupt: {reason}")]
    Corruption {
        /// Cache file being imported
        path: PathBuf,
        /// What did not add up
        reason: String,
    },

    /// Writing the new cache failed; the previous cache is untouched
    #[error("failed to export cache to {path}: {source}")]
    Export {
        /// Cache file being written
        path: PathBuf,
        /// Underlying encoding or I/O error
        #[source]
        source: CacheFileError,
    },

    /// Settings document could not be encoded
    #[error("invalid settings document: {0}")]
    Settings(#[from] serde_json::Error),

    /// A run phase was invoked out of order
    #[error("cannot {operation} while the cacher is {state}")]
    Phase {
        /// Operation that was attempted
        operation: &'static str,
        /// Current state
        state: CacherState,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corruption(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corruption {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for cache runs
pub type CacheResult<T> = Result<T, CacheError>;
