//! Parallel batch extraction.
//!
//! [`extract_all`] runs [`extract_video`] for every input on a dedicated
//! [`rayon`] pool with [`ExtractOptions::workers`] threads. Each worker opens
//! its own demuxer and decoder and writes into its own output directory, so
//! workers share nothing but the progress counter.
//!
//! The first error stops the batch: videos already running finish, queued
//! ones are not started, and the error is returned.
//!
//! Output directories are keyed by base-name only, so `a/clip.mp4` and
//! `b/clip.mp4` write into the same `<out_root>/clip/` and whichever finishes
//! last wins each frame path. [`extract_all`] logs a warning for every such
//! collision before starting.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use rayon::{
    ThreadPoolBuilder,
    iter::{IntoParallelRefIterator, ParallelIterator},
};

use crate::{
    configuration::ExtractOptions,
    error::FramesplitError,
    extractor::{VideoOutcome, extract_video},
    layout::base_name,
    progress::ProgressTracker,
};

/// A video that was not processed, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedVideo {
    /// The input file.
    pub path: PathBuf,
    /// Why it could not be opened.
    pub reason: String,
}

/// Totals for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct BatchReport {
    /// Videos whose frames were all written and verified.
    pub extracted: u64,
    /// Frames written across all extracted videos.
    pub frames: u64,
    /// Videos that could not be opened, in input order.
    pub skipped: Vec<SkippedVideo>,
}

/// Extract the frames of every video in `videos` under `out_root`.
///
/// # Errors
///
/// Returns the first [`FramesplitError`] any worker produced, or
/// [`FramesplitError::ThreadPool`] if the pool cannot be created.
///
/// # Example
///
/// ```no_run
/// use framesplit::{ExtractOptions, extract_all, find_videos};
///
/// let videos = find_videos("videos/")?;
/// let report = extract_all(&videos, "frames/", &ExtractOptions::new())?;
/// println!("{} frames from {} videos", report.frames, report.extracted);
/// # Ok::<(), framesplit::FramesplitError>(())
/// ```
pub fn extract_all<P: AsRef<Path>>(
    videos: &[PathBuf],
    out_root: P,
    options: &ExtractOptions,
) -> Result<BatchReport, FramesplitError> {
    let out_root = out_root.as_ref();
    for (name, paths) in shared_base_names(videos) {
        log::warn!(
            "{} videos share the base name {name:?} and will overwrite each other's frames in {}",
            paths.len(),
            out_root.join(&name).display()
        );
    }
    dispatch(videos, options, |video| extract_video(video, out_root))
}

/// Base names claimed by more than one video, with the claiming paths in
/// input order.
pub(crate) fn shared_base_names(videos: &[PathBuf]) -> BTreeMap<String, Vec<&Path>> {
    let mut by_name: BTreeMap<String, Vec<&Path>> = BTreeMap::new();
    for video in videos {
        by_name.entry(base_name(video)).or_default().push(video);
    }
    by_name.retain(|_, paths| paths.len() > 1);
    by_name
}

/// Run `worker` over `videos` on a pool of `options.workers` threads and
/// fold the outcomes into a [`BatchReport`].
pub(crate) fn dispatch<F>(
    videos: &[PathBuf],
    options: &ExtractOptions,
    worker: F,
) -> Result<BatchReport, FramesplitError>
where
    F: Fn(&Path) -> Result<VideoOutcome, FramesplitError> + Sync,
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .thread_name(|index| format!("framesplit-worker-{index}"))
        .build()?;
    let tracker = ProgressTracker::new(options.progress.clone(), videos.len() as u64);

    log::info!(
        "Extracting frames from {} video(s) with {} worker(s)",
        videos.len(),
        options.workers
    );

    let outcomes: Vec<VideoOutcome> = pool.install(|| {
        videos
            .par_iter()
            .map(|video| {
                let outcome = worker(video.as_path()).inspect_err(|error| {
                    log::debug!("{} failed: {error}", video.display());
                })?;
                tracker.advance(video);
                Ok(outcome)
            })
            .collect::<Result<Vec<_>, FramesplitError>>()
    })?;

    let mut report = BatchReport::default();
    for (video, outcome) in videos.iter().zip(outcomes) {
        match outcome {
            VideoOutcome::Extracted { frames } => {
                report.extracted += 1;
                report.frames += frames;
            }
            VideoOutcome::Skipped { reason } => report.skipped.push(SkippedVideo {
                path: video.clone(),
                reason,
            }),
        }
    }

    log::info!(
        "Wrote {} frame(s) from {} video(s); skipped {}",
        report.frames,
        report.extracted,
        report.skipped.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use image::{DynamicImage, Rgb, RgbImage};

    use super::*;
    use crate::{
        decoder::FrameSource,
        extractor::extract_from_source,
        progress::{ProgressCallback, ProgressInfo},
    };

    /// Yields `declared` frames whose colour depends on the frame index.
    struct Gradient {
        declared: u64,
        produced: u64,
    }

    impl FrameSource for Gradient {
        fn frame_count(&self) -> u64 {
            self.declared
        }

        fn next_frame(&mut self) -> Result<Option<DynamicImage>, FramesplitError> {
            if self.produced == self.declared {
                return Ok(None);
            }
            self.produced += 1;
            let shade = (self.produced * 17 % 256) as u8;
            Ok(Some(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                3,
                2,
                Rgb([shade, 255 - shade, 0]),
            ))))
        }
    }

    /// Every file below `root` with its contents, keyed by relative path.
    fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        fn walk(root: &Path, directory: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
            for entry in std::fs::read_dir(directory).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(root, &path, files);
                } else {
                    let relative = path.strip_prefix(root).unwrap().to_path_buf();
                    files.insert(relative, std::fs::read(&path).unwrap());
                }
            }
        }

        let mut files = BTreeMap::new();
        walk(root, root, &mut files);
        files
    }

    fn paths(count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|index| PathBuf::from(format!("video_{index}.mp4")))
            .collect()
    }

    #[test]
    fn folds_outcomes_in_input_order() {
        let videos = paths(4);
        let options = ExtractOptions::new().with_workers(2);

        let report = dispatch(&videos, &options, |video| {
            if video == Path::new("video_2.mp4") {
                Ok(VideoOutcome::Skipped {
                    reason: "unsupported".to_string(),
                })
            } else {
                Ok(VideoOutcome::Extracted { frames: 10 })
            }
        })
        .expect("batch failed");

        assert_eq!(report.extracted, 3);
        assert_eq!(report.frames, 30);
        assert_eq!(
            report.skipped,
            [SkippedVideo {
                path: PathBuf::from("video_2.mp4"),
                reason: "unsupported".to_string(),
            }]
        );
    }

    #[test]
    fn first_error_fails_the_batch() {
        let videos = paths(8);
        let options = ExtractOptions::new().with_workers(1);

        let result = dispatch(&videos, &options, |video| {
            if video == Path::new("video_3.mp4") {
                Err(FramesplitError::FrameCountMismatch {
                    path: video.to_path_buf(),
                    declared: 5,
                    decoded: 4,
                })
            } else {
                Ok(VideoOutcome::Extracted { frames: 1 })
            }
        });

        assert!(matches!(
            result,
            Err(FramesplitError::FrameCountMismatch {
                declared: 5,
                decoded: 4,
                ..
            })
        ));
    }

    #[test]
    fn never_exceeds_worker_count() {
        let videos = paths(32);
        let options = ExtractOptions::new().with_workers(3);
        let running = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let threads = Mutex::new(HashSet::new());

        dispatch(&videos, &options, |_| {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            threads
                .lock()
                .unwrap()
                .insert(std::thread::current().name().map(str::to_string));
            std::thread::sleep(std::time::Duration::from_millis(2));
            running.fetch_sub(1, Ordering::SeqCst);
            Ok(VideoOutcome::Extracted { frames: 0 })
        })
        .expect("batch failed");

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(threads.lock().unwrap().len() <= 3);
    }

    #[test]
    fn progress_counts_every_video() {
        struct Counter(AtomicUsize);

        impl ProgressCallback for Counter {
            fn on_progress(&self, info: &ProgressInfo) {
                assert_eq!(info.total, 5);
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let options = ExtractOptions::new()
            .with_workers(2)
            .with_progress(counter.clone());

        dispatch(&paths(5), &options, |_| {
            Ok(VideoOutcome::Extracted { frames: 1 })
        })
        .expect("batch failed");

        assert_eq!(counter.0.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn worker_count_does_not_change_output() {
        let videos = paths(9);
        let frames_for = |video: &Path| {
            let index: u64 = video
                .to_string_lossy()
                .trim_start_matches("video_")
                .trim_end_matches(".mp4")
                .parse()
                .unwrap();
            index * 3 % 7
        };

        let mut snapshots = Vec::new();
        for workers in [1, 4] {
            let out = tempfile::tempdir().expect("Failed to create temp dir");
            let options = ExtractOptions::new().with_workers(workers);

            let report = dispatch(&videos, &options, |video| {
                let mut source = Gradient {
                    declared: frames_for(video),
                    produced: 0,
                };
                let frames = extract_from_source(&mut source, video, out.path())?;
                Ok(VideoOutcome::Extracted { frames })
            })
            .expect("batch failed");

            assert_eq!(report.extracted, 9);
            let expected: u64 = videos.iter().map(|video| frames_for(video.as_path())).sum();
            assert_eq!(report.frames, expected);
            snapshots.push(snapshot(out.path()));
        }

        assert!(!snapshots[0].is_empty());
        assert_eq!(snapshots[0], snapshots[1]);
    }

    #[test]
    fn detects_shared_base_names() {
        let videos = vec![
            PathBuf::from("a/clip.mp4"),
            PathBuf::from("b/other.mp4"),
            PathBuf::from("c/clip.mp4"),
        ];

        let shared = shared_base_names(&videos);
        assert_eq!(shared.len(), 1);
        assert_eq!(
            shared["clip"],
            [Path::new("a/clip.mp4"), Path::new("c/clip.mp4")]
        );
        assert!(shared_base_names(&paths(4)).is_empty());
    }

    #[test]
    fn empty_batch_is_an_empty_report() {
        let report = dispatch(&[], &ExtractOptions::new(), |_| {
            panic!("worker must not run for an empty batch")
        })
        .expect("batch failed");
        assert_eq!(report, BatchReport::default());
    }
}
