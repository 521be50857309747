//! Background derivative computation.
//!
//! Expensive read-only derivatives (for example a low-detail preview of the
//! support mesh) can be computed on a worker thread while the caller keeps
//! going. The worker owns its input; the caller joins before using the
//! result.

use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::error::{CacheError, CacheResult};

/// A derivative being computed on a worker thread.
///
/// # Example
///
/// ```
/// use guide_cache::BackgroundDerivative;
///
/// let job = BackgroundDerivative::spawn("sum", || (1..=10).sum::<u32>()).ok();
/// // ... foreground work ...
/// let total = job.and_then(|j| j.join().ok());
/// assert_eq!(total, Some(55));
/// ```
#[derive(Debug)]
pub struct BackgroundDerivative<T> {
    label: String,
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> BackgroundDerivative<T> {
    /// Start `work` on a named worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Spawn`] if the thread cannot be created.
    pub fn spawn<F>(label: impl Into<String>, work: F) -> CacheResult<Self>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let label = label.into();
        let handle = thread::Builder::new()
            .name(format!("derive-{label}"))
            .spawn(work)
            .map_err(|source| CacheError::Spawn {
                label: label.clone(),
                source,
            })?;
        debug!(label = %label, "Started background derivative");
        Ok(Self { label, handle })
    }

    /// Label given at spawn time.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the worker has finished. Never blocks.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker and take its result.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::BackgroundFailed`] if the worker panicked.
    pub fn join(self) -> CacheResult<T> {
        let Self { label, handle } = self;
        handle.join().map_err(|_| {
            warn!(label = %label, "Background derivative panicked");
            CacheError::BackgroundFailed { label }
        })
    }
}
