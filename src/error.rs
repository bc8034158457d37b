//! Error types for the `framesplit` crate.
//!
//! This module defines [`FramesplitError`], the unified error type returned
//! by all fallible operations in the crate. Errors carry the path of the
//! video (or directory) involved so a failed batch can be diagnosed from the
//! message alone.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use rayon::ThreadPoolBuildError;
use thiserror::Error;
use walkdir::Error as WalkError;

/// The unified error type for all `framesplit` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramesplitError {
    /// The video file could not be opened for decoding.
    ///
    /// The extractor turns this into a
    /// [`VideoOutcome::Skipped`](crate::VideoOutcome::Skipped) rather than
    /// failing the batch.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoReader::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in {0}")]
    NoVideoStream(PathBuf),

    /// A decoded frame could not be turned into an image.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// The number of frames decoded differs from the frame count the
    /// container declared.
    #[error(
        "Frame count mismatch in {path}: container declares {declared} frames but {decoded} were decoded"
    )]
    FrameCountMismatch {
        /// The video whose check failed.
        path: PathBuf,
        /// Frame count read from the video's metadata before decoding.
        declared: u64,
        /// Frames actually decoded and written.
        decoded: u64,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// PNG encoding failed.
    #[error("Image encoding error: {0}")]
    ImageError(#[from] ImageError),

    /// The input directory could not be traversed.
    #[error("Failed to walk input directory: {0}")]
    DirectoryWalk(#[from] WalkError),

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] ThreadPoolBuildError),
}

impl From<FfmpegError> for FramesplitError {
    fn from(error: FfmpegError) -> Self {
        FramesplitError::FfmpegError(error.to_string())
    }
}

impl FramesplitError {
    /// Returns `true` for errors that mean "this file is not a decodable
    /// video" as opposed to a failure while processing one.
    pub fn is_unopenable(&self) -> bool {
        matches!(
            self,
            FramesplitError::FileOpen { .. } | FramesplitError::NoVideoStream(_)
        )
    }
}
