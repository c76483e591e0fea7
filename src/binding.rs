//! Safe wrapper around a [`NativeConverter`].
//!
//! [`GifGenerator`] owns the working output buffer for the duration of one
//! native call, checks what the converter reports, and hands back an
//! independently owned `Vec<u8>` sized to the result.
//!
//! # Example
//!
//! ```no_run
//! use gifgen::{ConversionOptions, GifGenerator};
//!
//! let video = std::fs::read("input.h264")?;
//! let generator = GifGenerator::with_defaults()
//!     .options(ConversionOptions::new().with_output_capacity(4 << 20));
//! let gif = generator.convert(5, 90, &video)?;
//! std::fs::write("output.gif", gif)?;
//! # Ok::<(), gifgen::GifGenError>(())
//! ```

use std::ffi::c_int;

use crate::configuration::ConversionOptions;
use crate::converter::FfmpegConverter;
use crate::error::GifGenError;
use crate::native::{NativeConverter, STATUS_OK};

/// Converts video buffers to GIFs through a [`NativeConverter`].
#[derive(Debug, Clone)]
pub struct GifGenerator<C = FfmpegConverter> {
    converter: C,
    options: ConversionOptions,
}

impl GifGenerator<FfmpegConverter> {
    /// The FFmpeg converter with default [`GifOptions`](crate::GifOptions)
    /// and default conversion options.
    pub fn with_defaults() -> Self {
        Self::new(FfmpegConverter::default())
    }
}

impl Default for GifGenerator<FfmpegConverter> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<C: NativeConverter> GifGenerator<C> {
    /// Wrap a converter with default options.
    pub fn new(converter: C) -> Self {
        Self {
            converter,
            options: ConversionOptions::default(),
        }
    }

    /// Replace the conversion options.
    pub fn options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    /// The current conversion options.
    pub fn conversion_options(&self) -> &ConversionOptions {
        &self.options
    }

    /// The wrapped converter.
    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Convert `input` into a GIF covering `duration` seconds, rotated by
    /// `rotation` degrees.
    ///
    /// Neither parameter is validated here; the converter interprets them.
    /// The call blocks until the converter returns and is never retried.
    ///
    /// # Errors
    ///
    /// - [`GifGenError::EmptyInput`] if `input` is empty. The converter is
    ///   not called.
    /// - [`GifGenError::Conversion`] if the converter returns a non-zero
    ///   status.
    /// - [`GifGenError::OutputOverflow`] if the converter reports a length
    ///   that does not fit the working buffer.
    pub fn convert(
        &self,
        duration: i32,
        rotation: i32,
        input: &[u8],
    ) -> Result<Vec<u8>, GifGenError> {
        if input.is_empty() {
            return Err(GifGenError::EmptyInput);
        }

        let capacity = self.options.output_capacity;
        let mut buffer = vec![0u8; capacity];
        let mut output_size: c_int = 0;

        log::debug!(
            "Converting {} input bytes (duration={}s, rotation={}, capacity={})",
            input.len(),
            duration,
            rotation,
            capacity,
        );

        let status =
            self.converter
                .gen_gif(duration, rotation, input, &mut buffer, &mut output_size);
        if status != STATUS_OK {
            log::debug!("Converter failed with status {status}");
            return Err(GifGenError::Conversion { code: status });
        }

        let length = usize::try_from(output_size)
            .ok()
            .filter(|&length| length <= capacity)
            .ok_or(GifGenError::OutputOverflow {
                reported: i64::from(output_size),
                capacity,
            })?;

        Ok(buffer[..length].to_vec())
    }
}

/// Convert `input` into a GIF with the FFmpeg converter and default options.
///
/// Shorthand for `GifGenerator::with_defaults().convert(duration, rotation, input)`.
pub fn gen_gif(duration: i32, rotation: i32, input: &[u8]) -> Result<Vec<u8>, GifGenError> {
    GifGenerator::with_defaults().convert(duration, rotation, input)
}
