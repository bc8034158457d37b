//! Recursive discovery of input videos.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::error::FramesplitError;

/// Extension (without the dot) of the files that are processed.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Find every `.mp4` file below `input_root`.
///
/// Entries within each directory are visited in file-name order, so the
/// result is stable across runs. Matching is on the exact extension; directories never match.
///
/// # Errors
///
/// Returns [`FramesplitError::DirectoryWalk`] if `input_root` does not exist
/// or any part of the tree cannot be read.
///
/// # Example
///
/// ```no_run
/// let videos = framesplit::find_videos("videos/")?;
/// println!("{} videos", videos.len());
/// # Ok::<(), framesplit::FramesplitError>(())
/// ```
pub fn find_videos<P: AsRef<Path>>(input_root: P) -> Result<Vec<PathBuf>, FramesplitError> {
    let input_root = input_root.as_ref();
    let mut videos = Vec::new();

    let walker = WalkDir::new(input_root)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && has_video_extension(entry.path()) {
            videos.push(entry.into_path());
        }
    }

    log::debug!(
        "Found {} .{VIDEO_EXTENSION} file(s) under {}",
        videos.len(),
        input_root.display()
    );
    Ok(videos)
}

/// Whether `path` ends in `.mp4`.
pub fn has_video_extension(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(VIDEO_EXTENSION))
}
