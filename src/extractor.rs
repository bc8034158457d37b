//! Per-video frame extraction.
//!
//! [`extract_video`] is the unit of work the dispatcher runs for each input
//! file: open it, write every frame as a PNG into the video's own directory,
//! then check the number of frames written against the number the container
//! declared.
//!
//! Files that cannot be opened as video produce
//! [`VideoOutcome::Skipped`] and leave nothing on disk. A frame-count
//! mismatch is returned as [`FramesplitError::FrameCountMismatch`].

use std::{fs, path::Path};

use image::ImageFormat;

use crate::{
    decoder::{FrameSource, VideoReader},
    error::FramesplitError,
    layout::FrameLayout,
};

/// What happened to one input video.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum VideoOutcome {
    /// All frames were written and the count check passed.
    Extracted {
        /// Frames written.
        frames: u64,
    },
    /// The file could not be opened as a video; nothing was written.
    Skipped {
        /// Why the file was not opened.
        reason: String,
    },
}

/// Extract every frame of `video_path` into `<out_root>/<base_name>/`.
///
/// # Errors
///
/// - [`FramesplitError::FrameCountMismatch`] if the decoded frame total
///   differs from the declared frame count. Frames decoded before the check
///   stay on disk.
/// - [`FramesplitError::IoError`] / [`FramesplitError::ImageError`] if the
///   directory or a frame cannot be written.
///
/// # Example
///
/// ```no_run
/// use framesplit::{VideoOutcome, extract_video};
///
/// match extract_video("videos/clip.mp4", "frames/")? {
///     VideoOutcome::Extracted { frames } => println!("{frames} frames"),
///     VideoOutcome::Skipped { reason } => println!("skipped: {reason}"),
/// }
/// # Ok::<(), framesplit::FramesplitError>(())
/// ```
pub fn extract_video<P, Q>(video_path: P, out_root: Q) -> Result<VideoOutcome, FramesplitError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let video_path = video_path.as_ref();

    let mut reader = match VideoReader::open(video_path) {
        Ok(reader) => reader,
        Err(error) if error.is_unopenable() => {
            log::debug!("Skipping {}: {error}", video_path.display());
            return Ok(VideoOutcome::Skipped {
                reason: error.to_string(),
            });
        }
        Err(error) => return Err(error),
    };

    let frames = extract_from_source(&mut reader, video_path, out_root.as_ref())?;
    Ok(VideoOutcome::Extracted { frames })
}

/// Drain `source` into PNG files laid out for `video_path` under `out_root`
/// and verify the count.
///
/// The output directory is created before the first frame is decoded, so a
/// source with no frames still leaves an empty directory behind. Returns the
/// number of frames written.
pub fn extract_from_source<S>(
    source: &mut S,
    video_path: &Path,
    out_root: &Path,
) -> Result<u64, FramesplitError>
where
    S: FrameSource + ?Sized,
{
    let declared = source.frame_count();
    let layout = FrameLayout::new(video_path, out_root);
    fs::create_dir_all(layout.directory())?;

    let mut index = 1_u64;
    while let Some(frame) = source.next_frame()? {
        frame.save_with_format(layout.frame_path(index), ImageFormat::Png)?;
        index += 1;
    }
    let decoded = index - 1;

    if decoded != declared {
        return Err(FramesplitError::FrameCountMismatch {
            path: video_path.to_path_buf(),
            declared,
            decoded,
        });
    }

    log::debug!(
        "{}: wrote {decoded} frame(s) to {}",
        video_path.display(),
        layout.directory().display()
    );
    Ok(decoded)
}
