//! Sequential video decoding.
//!
//! [`FrameSource`] is the seam between the extractor and the decoding
//! backend: something that declares a frame count up front and then yields
//! frames one at a time until the stream ends. [`VideoReader`] implements it
//! on top of FFmpeg, reading packets on demand so only one decoded frame is
//! held in memory at a time.
//!
//! # Example
//!
//! ```no_run
//! use framesplit::{FrameSource, VideoReader};
//!
//! let mut reader = VideoReader::open("input.mp4")?;
//! println!("declared frames: {}", reader.frame_count());
//! while let Some(frame) = reader.next_frame()? {
//!     println!("{}x{}", frame.width(), frame.height());
//! }
//! # Ok::<(), framesplit::FramesplitError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{
    error::FramesplitError,
    metadata::{FrameCountSource, VideoMetadata, estimate_frame_count},
};

/// Consecutive non-EOF read failures tolerated before the stream is
/// treated as ended.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 32;

/// Unit of container-level durations (`AV_TIME_BASE`).
const CONTAINER_TIME_BASE: Rational = Rational(1, 1_000_000);

/// A sequential source of decoded frames.
///
/// Sources are opened and drained on the same worker thread, so no
/// `Send` bound is required.
pub trait FrameSource {
    /// The frame count the source declared before decoding started.
    fn frame_count(&self) -> u64;

    /// Decode the next frame.
    ///
    /// Returns `Ok(None)` once the stream is exhausted. Calling again after
    /// that keeps returning `Ok(None)`.
    fn next_frame(&mut self) -> Result<Option<DynamicImage>, FramesplitError>;
}

/// An FFmpeg-backed [`FrameSource`] over the best video stream of a file.
///
/// Every frame is converted to 8-bit RGB at its native resolution.
pub struct VideoReader {
    input_context: Input,
    decoder: VideoDecoder,
    /// Built lazily from the first decoded frame, rebuilt if the frame
    /// geometry or pixel format changes mid-stream.
    scaler: Option<ScalingContext>,
    video_stream_index: usize,
    metadata: VideoMetadata,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    file_path: PathBuf,
    eof_sent: bool,
    done: bool,
}

impl Debug for VideoReader {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoReader")
            .field("file_path", &self.file_path)
            .field("video_stream_index", &self.video_stream_index)
            .field("metadata", &self.metadata)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl VideoReader {
    /// Open a video file for sequential decoding.
    ///
    /// Initializes FFmpeg (idempotent), opens the container, selects the
    /// best video stream and reads its metadata.
    ///
    /// # Errors
    ///
    /// - [`FramesplitError::FileOpen`] if the file cannot be opened or no
    ///   decoder is available for its video stream.
    /// - [`FramesplitError::NoVideoStream`] if the file has no video.
    /// - [`FramesplitError::FfmpegError`] if FFmpeg itself fails to
    ///   initialise.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FramesplitError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening video file: {}", file_path.display());

        crate::ffmpeg::initialize().map_err(initialization_error)?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| FramesplitError::FileOpen {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or_else(|| FramesplitError::NoVideoStream(file_path.clone()))?;
        let video_stream_index = stream.index();

        let decoder_context = CodecContext::from_parameters(stream.parameters()).map_err(
            |error| FramesplitError::FileOpen {
                path: file_path.clone(),
                reason: format!("Failed to read video codec parameters: {error}"),
            },
        )?;
        let decoder =
            decoder_context
                .decoder()
                .video()
                .map_err(|error| FramesplitError::FileOpen {
                    path: file_path.clone(),
                    reason: format!("Failed to create video decoder: {error}"),
                })?;

        let frame_rate = [stream.avg_frame_rate(), stream.rate()]
            .into_iter()
            .find(|rate| rational_to_f64(*rate).is_some())
            .unwrap_or(Rational(0, 1));
        let frames_per_second = rational_to_f64(frame_rate).unwrap_or(0.0);

        let (duration_ticks, duration_time_base) = if stream.duration() > 0 {
            (stream.duration(), stream.time_base())
        } else {
            (input_context.duration().max(0), CONTAINER_TIME_BASE)
        };
        let duration = Duration::from_secs_f64(
            duration_ticks as f64 * rational_to_f64(duration_time_base).unwrap_or(0.0),
        );

        let (frame_count, frame_count_source) = if stream.frames() > 0 {
            (stream.frames() as u64, FrameCountSource::Container)
        } else {
            (
                estimate_frame_count(duration_ticks, duration_time_base, frame_rate),
                FrameCountSource::Estimated,
            )
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            frame_count_source,
            duration,
            codec,
        };

        log::debug!(
            "{}: {}x{} @ {:.3} fps, {} frames ({:?}) [{}]",
            file_path.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
            metadata.frame_count_source,
            metadata.codec,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler: None,
            video_stream_index,
            metadata,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            file_path,
            eof_sent: false,
            done: false,
        })
    }

    /// Metadata read when the file was opened.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path the reader was opened with.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Convert the frame currently held in `decoded_frame` to RGB.
    fn convert_current_frame(&mut self) -> Result<DynamicImage, FramesplitError> {
        let format = self.decoded_frame.format();
        let width = self.decoded_frame.width();
        let height = self.decoded_frame.height();

        let stale = self.scaler.as_ref().is_none_or(|scaler| {
            scaler.input().format != format
                || scaler.input().width != width
                || scaler.input().height != height
        });
        if stale {
            self.scaler = Some(ScalingContext::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?);
        }

        let Some(scaler) = self.scaler.as_mut() else {
            return Err(FramesplitError::VideoDecodeError(
                "Scaler unavailable".to_string(),
            ));
        };
        scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;

        let buffer = packed_rgb_buffer(&self.rgb_frame, width, height);
        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            FramesplitError::VideoDecodeError(format!(
                "Decoded frame data does not fill a {width}x{height} RGB image"
            ))
        })?;
        Ok(DynamicImage::ImageRgb8(image))
    }
}

impl FrameSource for VideoReader {
    fn frame_count(&self) -> u64 {
        self.metadata.frame_count
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>, FramesplitError> {
        if self.done {
            return Ok(None);
        }

        let mut read_errors = 0_u32;
        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                return self.convert_current_frame().map(Some).inspect_err(|_| {
                    self.done = true;
                });
            }

            if self.eof_sent {
                self.done = true;
                return Ok(None);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    read_errors = 0;
                    if packet.stream() != self.video_stream_index {
                        continue;
                    }
                    if let Err(error) = self.decoder.send_packet(&packet) {
                        log::warn!(
                            "{}: decoder rejected packet (pts {:?}): {error}",
                            self.file_path.display(),
                            packet.pts(),
                        );
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    read_errors += 1;
                    log::warn!("{}: packet read failed: {error}", self.file_path.display());
                    if read_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                        self.decoder.send_eof()?;
                        self.eof_sent = true;
                    }
                }
            }
        }
    }
}

/// A failed library initialisation affects every file, so it is fatal rather
/// than a per-file open failure.
fn initialization_error(error: FfmpegError) -> FramesplitError {
    FramesplitError::FfmpegError(format!("FFmpeg initialisation failed: {error}"))
}

fn rational_to_f64(rational: Rational) -> Option<f64> {
    if rational.numerator() > 0 && rational.denominator() > 0 {
        Some(rational.numerator() as f64 / rational.denominator() as f64)
    } else {
        None
    }
}

/// Copy an RGB24 plane into a buffer without FFmpeg's per-row padding.
fn packed_rgb_buffer(frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let row_bytes = width as usize * 3;
    let stride = frame.stride(0);
    let plane = frame.data(0);

    if stride == row_bytes {
        return plane[..row_bytes * height as usize].to_vec();
    }

    plane
        .chunks(stride)
        .take(height as usize)
        .flat_map(|row| &row[..row_bytes])
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_conversion_rejects_zero_terms() {
        assert_eq!(rational_to_f64(Rational::new(30, 1)), Some(30.0));
        assert_eq!(rational_to_f64(Rational::new(0, 1)), None);
        assert_eq!(rational_to_f64(Rational::new(25, 0)), None);
    }

    #[test]
    fn initialization_failure_is_fatal() {
        let error = initialization_error(FfmpegError::Bug);
        assert!(matches!(error, FramesplitError::FfmpegError(_)));
        assert!(!error.is_unopenable());
        assert!(error.to_string().contains("initialisation"));
    }

    #[test]
    fn open_missing_file_is_unopenable() {
        let error = VideoReader::open("definitely_missing_video.mp4").unwrap_err();
        assert!(error.is_unopenable(), "unexpected error: {error}");
    }
}
