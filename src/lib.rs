//! # framesplit
//!
//! Split every video in a directory tree into numbered PNG frames, one
//! output folder per video, using all CPU cores.
//!
//! Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate; frames are
//! encoded with [`image`] and videos are processed concurrently on a
//! [`rayon`] pool.
//!
//! ## Quick Start
//!
//! ```no_run
//! use framesplit::{ExtractOptions, extract_all, find_videos};
//!
//! let videos = find_videos("videos/")?;
//! let report = extract_all(&videos, "frames/", &ExtractOptions::new())?;
//! println!("{} frames written", report.frames);
//! # Ok::<(), framesplit::FramesplitError>(())
//! ```
//!
//! For `videos/clip.mp4` with three frames this writes:
//!
//! ```text
//! frames/clip/clip_00001.png
//! frames/clip/clip_00002.png
//! frames/clip/clip_00003.png
//! ```
//!
//! ## Failure semantics
//!
//! - Files that cannot be opened as video are skipped and listed in the
//!   [`BatchReport`].
//! - After decoding, the number of frames written must equal the frame count
//!   the container declared; otherwise the batch fails with
//!   [`FramesplitError::FrameCountMismatch`].
//! - Filesystem errors fail the batch.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod configuration;
pub mod decoder;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod extractor;
pub mod ffmpeg;
pub mod layout;
pub mod metadata;
pub mod progress;

pub use configuration::ExtractOptions;
pub use decoder::{FrameSource, VideoReader};
pub use discovery::{VIDEO_EXTENSION, find_videos, has_video_extension};
pub use dispatch::{BatchReport, SkippedVideo, extract_all};
pub use error::FramesplitError;
pub use extractor::{VideoOutcome, extract_from_source, extract_video};
pub use ffmpeg::{FfmpegLogLevel, UnknownLogLevel, set_ffmpeg_log_level};
pub use layout::{FrameLayout, frame_file_name};
pub use metadata::{FrameCountSource, VideoMetadata};
pub use progress::{ProgressCallback, ProgressInfo};
