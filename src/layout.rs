//! Output naming.
//!
//! Every video gets its own directory under the output root, named after
//! the video's base-name, and every frame is written as
//! `<base>_<index>.png` with the index zero-padded to five digits:
//!
//! ```text
//! <out_root>/clip/clip_00001.png
//! <out_root>/clip/clip_00002.png
//! ```

use std::path::{Path, PathBuf};

/// Extension of every frame image.
pub const FRAME_EXTENSION: &str = "png";

/// Minimum number of digits in a frame index. Longer indices are written
/// in full.
pub const FRAME_INDEX_WIDTH: usize = 5;

/// The on-disk locations for one video's frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    base_name: String,
    directory: PathBuf,
}

impl FrameLayout {
    /// Compute the layout for `video_path` under `out_root`.
    pub fn new(video_path: &Path, out_root: &Path) -> Self {
        let base_name = base_name(video_path);
        let directory = out_root.join(&base_name);
        Self {
            base_name,
            directory,
        }
    }

    /// The video's base-name.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// The per-video output directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the frame with the given 1-based index.
    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.directory.join(frame_file_name(&self.base_name, index))
    }
}

/// File name with its extension removed, lossily decoded as UTF-8.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `"{base}_{index:05}.png"`.
pub fn frame_file_name(base_name: &str, index: u64) -> String {
    format!(
        "{base_name}_{index:0width$}.{FRAME_EXTENSION}",
        width = FRAME_INDEX_WIDTH
    )
}
