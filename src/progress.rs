//! Batch progress reporting.
//!
//! A [`ProgressCallback`] attached through
//! [`ExtractOptions::with_progress`](crate::ExtractOptions::with_progress)
//! receives one [`ProgressInfo`] snapshot each time a video finishes, from
//! whichever worker finished it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framesplit::{ExtractOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("{pct:.1}% ({}/{})", info.current, info.total);
//!         }
//!     }
//! }
//!
//! let options = ExtractOptions::new().with_progress(Arc::new(PrintProgress));
//! ```

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// A snapshot of batch progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Videos finished so far (extracted or skipped).
    pub current: u64,
    /// Videos in the batch.
    pub total: u64,
    /// Completion percentage (0.0 – 100.0); `None` for an empty batch.
    pub percentage: Option<f32>,
    /// Wall-clock time since the batch started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on throughput so far.
    pub estimated_remaining: Option<Duration>,
    /// The video that just finished.
    pub video: PathBuf,
}

/// Receives progress updates during a batch.
///
/// Implementations must be [`Send`] and [`Sync`]: callbacks run on worker
/// threads. Callbacks observe only; they cannot stop the batch.
pub trait ProgressCallback: Send + Sync {
    /// Called once per finished video.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all notifications. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Counts finished videos across workers and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: u64,
    current: Mutex<u64>,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: u64) -> Self {
        Self {
            callback,
            total,
            current: Mutex::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one finished video and notify the callback.
    ///
    /// The counter lock is held while the callback runs so reports arrive
    /// in increasing `current` order.
    pub(crate) fn advance(&self, video: &Path) {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current += 1;
        let info = self.snapshot(*current, video);
        self.callback.on_progress(&info);
    }

    fn snapshot(&self, current: u64, video: &Path) -> ProgressInfo {
        let elapsed = self.start_time.elapsed();

        let percentage = (self.total > 0)
            .then(|| (current as f32 / self.total as f32) * 100.0);

        let estimated_remaining = (current > 0).then(|| {
            let remaining = self.total.saturating_sub(current);
            elapsed.div_f64(current as f64).mul_f64(remaining as f64)
        });

        ProgressInfo {
            current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            video: video.to_path_buf(),
        }
    }
}
