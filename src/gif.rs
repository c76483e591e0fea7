//! Animated GIF encoding.
//!
//! This module provides [`GifOptions`] for configuring the FFmpeg converter's
//! output and the in-memory encoder it uses once frames have been decoded,
//! rotated and scaled.
//!
//! # Example
//!
//! ```no_run
//! use gifgen::{FfmpegConverter, GifGenerator, GifOptions};
//!
//! let options = GifOptions::new().width(480).frame_rate(10);
//! let generator = GifGenerator::new(FfmpegConverter::new(options));
//!
//! let video = std::fs::read("input.h264")?;
//! let gif = generator.convert(3, 0, &video)?;
//! # Ok::<(), gifgen::GifGenError>(())
//! ```

use gif::{Encoder, Frame, Repeat};
use image::RgbaImage;

use crate::conversion::frame_delay;
use crate::error::GifGenError;

/// Configuration for the GIF produced by [`FfmpegConverter`](crate::FfmpegConverter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifOptions {
    /// Target width in pixels. Height follows the aspect ratio, rounded to
    /// an even number.
    pub width: u32,
    /// Frames per second of the GIF (default: 5).
    pub frame_rate: u32,
    /// Source frame rate assumed when the stream does not declare one
    /// (default: 25).
    pub fallback_source_frame_rate: u32,
    /// How many times the GIF should repeat. `None` means loop forever.
    pub repeat: Option<u16>,
    /// Palette quantiser speed, 1 (best) to 30 (fastest). Default: 10.
    pub quantizer_speed: i32,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            width: 320,
            frame_rate: 5,
            fallback_source_frame_rate: 25,
            repeat: None,
            quantizer_speed: 10,
        }
    }
}

impl GifOptions {
    /// Create a new [`GifOptions`] with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target width (height is auto-scaled to preserve aspect ratio).
    pub fn width(mut self, width: u32) -> Self {
        self.width = width.max(2);
        self
    }

    /// Set the GIF frame rate. Zero is treated as one.
    pub fn frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate.max(1);
        self
    }

    /// Set the source frame rate assumed for streams without timing info.
    pub fn fallback_source_frame_rate(mut self, frame_rate: u32) -> Self {
        self.fallback_source_frame_rate = frame_rate.max(1);
        self
    }

    /// Set the repeat count. `None` means loop forever.
    pub fn repeat(mut self, repeat: Option<u16>) -> Self {
        self.repeat = repeat;
        self
    }

    /// Set the quantiser speed (clamped to 1..=30).
    pub fn quantizer_speed(mut self, speed: i32) -> Self {
        self.quantizer_speed = speed.clamp(1, 30);
        self
    }
}

/// Encode a sequence of frames as an animated GIF into memory.
///
/// Every frame must have the dimensions of the first one. Each frame is
/// quantised to a 256-colour palette by the `gif` crate.
pub(crate) fn encode_gif_to_memory(
    frames: &[RgbaImage],
    config: &GifOptions,
) -> Result<Vec<u8>, GifGenError> {
    log::debug!(
        "Encoding {} frames to GIF in memory (fps={}, repeat={:?})",
        frames.len(),
        config.frame_rate,
        config.repeat,
    );
    let first = frames.first().ok_or(GifGenError::NoFrames)?;

    let width = u16::try_from(first.width()).map_err(|_| {
        GifGenError::GifEncodeError(format!("Frame width {} exceeds GIF limits", first.width()))
    })?;
    let height = u16::try_from(first.height()).map_err(|_| {
        GifGenError::GifEncodeError(format!(
            "Frame height {} exceeds GIF limits",
            first.height()
        ))
    })?;
    let delay = frame_delay(config.frame_rate);
    let speed = config.quantizer_speed.clamp(1, 30);

    let mut buffer = Vec::new();

    {
        let mut encoder = Encoder::new(&mut buffer, width, height, &[]).map_err(|e| {
            GifGenError::GifEncodeError(format!("Failed to create GIF encoder: {e}"))
        })?;

        let repeat = match config.repeat {
            None => Repeat::Infinite,
            Some(n) => Repeat::Finite(n),
        };
        encoder
            .set_repeat(repeat)
            .map_err(|e| GifGenError::GifEncodeError(format!("Failed to set GIF repeat: {e}")))?;

        for image in frames {
            if image.dimensions() != first.dimensions() {
                return Err(GifGenError::GifEncodeError(format!(
                    "Frame size {:?} differs from first frame {:?}",
                    image.dimensions(),
                    first.dimensions(),
                )));
            }

            let mut pixels = image.as_raw().clone();
            let mut gif_frame =
                Frame::from_rgba_speed(width, height, &mut pixels, speed);
            gif_frame.delay = delay;

            encoder.write_frame(&gif_frame).map_err(|e| {
                GifGenError::GifEncodeError(format!("Failed to write GIF frame: {e}"))
            })?;
        }
    }

    Ok(buffer)
}
