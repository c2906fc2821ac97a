//! Cache storage error types.

use std::path::PathBuf;

/// Errors that can occur when writing a cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Filesystem operation failed
    #[error("cache I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize cache contents
    #[error("failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }
}
