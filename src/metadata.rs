//! Media metadata types.
//!
//! Returned by [`inspect`](crate::inspect::inspect). Everything is owned, so the
//! demuxer that produced it is already closed.

use std::time::Duration;

/// Container-level and per-stream description of an input.
///
/// # Example
///
/// ```no_run
/// let video = std::fs::read("input.h264")?;
/// let metadata = gifgen::inspect(&video)?;
/// println!("Format: {}", metadata.format);
/// if let Some(video) = &metadata.video {
///     println!("{}x{} @ {} fps", video.width, video.height, video.frames_per_second);
/// }
/// # Ok::<(), gifgen::GifGenError>(())
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct MediaMetadata {
    /// Best video stream, if any.
    pub video: Option<VideoMetadata>,
    /// Best audio stream, if any.
    pub audio: Option<AudioMetadata>,
    /// Container duration; zero when the demuxer cannot tell.
    pub duration: Duration,
    /// Demuxer name (e.g. `"h264"`, `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
    /// Every stream in container order.
    pub streams: Vec<StreamInfo>,
}

/// Metadata for a video stream.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Guessed frame rate; `0.0` when unknown.
    pub frames_per_second: f64,
    /// Codec name (e.g. `"h264"`).
    pub codec: String,
}

/// Metadata for an audio stream.
#[derive(Debug, Clone)]
#[must_use]
pub struct AudioMetadata {
    /// Sample rate in hertz.
    pub sample_rate: u32,
    /// Number of channels.
    pub channels: u16,
    /// Codec name (e.g. `"aac"`).
    pub codec: String,
    /// Bit rate in bits per second; zero when unknown.
    pub bit_rate: u64,
}

/// One line of the stream table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    /// Index within the container.
    pub index: usize,
    /// Media type, as FFmpeg names it (`"video"`, `"audio"`, ...).
    pub media_type: String,
    /// Codec identifier name, e.g. `"H264"`.
    pub codec_id: String,
    /// Short decoder name, when FFmpeg has a decoder for the stream.
    pub decoder_name: Option<String>,
    /// Descriptive decoder name.
    pub decoder_long_name: Option<String>,
}
