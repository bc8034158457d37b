//! Video stream metadata.
//!
//! [`VideoMetadata`] is read once when a [`VideoReader`](crate::VideoReader)
//! opens a file. Its [`frame_count`](VideoMetadata::frame_count) is the
//! number the extractor verifies the decoded frame total against.

use std::time::Duration;

use ffmpeg_next::Rational;

/// Where a declared frame count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCountSource {
    /// The container header stores the number of frames (`nb_frames`).
    Container,
    /// The container has no frame count; it was estimated from the stream
    /// duration and average frame rate.
    Estimated,
}

/// Metadata for the video stream of a file.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frames per second (0.0 when the container does not say).
    pub frames_per_second: f64,
    /// Declared number of frames. A hint, not a guarantee.
    pub frame_count: u64,
    /// How [`frame_count`](VideoMetadata::frame_count) was obtained.
    pub frame_count_source: FrameCountSource,
    /// Duration of the video stream.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"mpeg4"`).
    pub codec: String,
}

/// Estimate a frame count from a duration of `ticks` in `time_base` units
/// and a frame rate, rounded to the nearest frame.
///
/// The product is formed exactly in integers: a stream of N frames at
/// 30000/1001 fps must estimate N, not N - 1.
pub(crate) fn estimate_frame_count(ticks: i64, time_base: Rational, frame_rate: Rational) -> u64 {
    let numerator = i128::from(ticks)
        * i128::from(time_base.numerator())
        * i128::from(frame_rate.numerator());
    let denominator =
        i128::from(time_base.denominator()) * i128::from(frame_rate.denominator());
    if numerator <= 0 || denominator <= 0 {
        return 0;
    }

    let rounded = (2 * numerator + denominator) / (2 * denominator);
    u64::try_from(rounded).unwrap_or(u64::MAX)
}
