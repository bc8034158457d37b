//! Batch configuration.
//!
//! [`ExtractOptions`] carries the worker count and progress callback into
//! [`extract_all`](crate::extract_all). The worker count defaults to the
//! number of logical CPUs, computed once when the options are built.
//!
//! # Example
//!
//! ```no_run
//! use framesplit::ExtractOptions;
//!
//! let options = ExtractOptions::new().with_workers(4);
//! assert_eq!(options.workers(), 4);
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use crate::progress::{NoOpProgress, ProgressCallback};

/// Settings for a batch run.
#[derive(Clone)]
pub struct ExtractOptions {
    /// Number of videos processed concurrently. Always at least 1.
    pub(crate) workers: usize,
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Options with one worker per logical CPU and no progress callback.
    pub fn new() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Set the number of concurrent workers.
    ///
    /// `0` restores the logical CPU count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = if workers == 0 {
            num_cpus::get().max(1)
        } else {
            workers
        };
        self
    }

    /// Attach a progress callback, invoked once per finished video.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// The configured worker count.
    pub fn workers(&self) -> usize {
        self.workers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_logical_cpus() {
        assert_eq!(ExtractOptions::new().workers(), num_cpus::get().max(1));
    }

    #[test]
    fn zero_workers_means_cpu_count() {
        let options = ExtractOptions::new().with_workers(3).with_workers(0);
        assert_eq!(options.workers(), num_cpus::get().max(1));
    }
}
