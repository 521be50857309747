//! Error types for the resource cache.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised by the resource cache.
///
/// Missing building blocks are not errors; accessors return empty values
/// for them. Only background work can fail.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The worker thread of a background derivative panicked.
    #[error("background derivative '{label}' failed")]
    BackgroundFailed {
        /// Label of the derivative.
        label: String,
    },

    /// The worker thread could not be started.
    #[error("could not start background derivative '{label}': {source}")]
    Spawn {
        /// Label of the derivative.
        label: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
