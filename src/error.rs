//! Error types for the `gifgen` crate.
//!
//! This module defines [`GifGenError`], the unified error type returned by all
//! fallible operations in the crate. Converter failures that cross the native
//! boundary are reduced to a status code; everything on the Rust side keeps
//! its full context.

use std::io::Error as IoError;
#[cfg(feature = "async")]
use std::time::Duration;

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// The unified error type for all `gifgen` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GifGenError {
    /// The input buffer was empty. Rejected before the converter is called.
    #[error("Input buffer is empty")]
    EmptyInput,

    /// The converter returned a non-zero status code.
    ///
    /// The code is carried verbatim; only its zero/non-zero distinction is
    /// meaningful.
    #[error("Conversion failed, ret={code}")]
    Conversion {
        /// Status code reported by the converter.
        code: i32,
    },

    /// The converter reported an output length outside the working buffer.
    #[error("Converter reported {reported} output bytes but the buffer holds {capacity}")]
    OutputOverflow {
        /// Length reported through the out-parameter.
        reported: i64,
        /// Capacity of the working buffer handed to the converter.
        capacity: usize,
    },

    /// No frame survived decoding and sampling.
    #[error("No frames decoded from input")]
    NoFrames,

    /// A caller-supplied parameter was out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// FFmpeg could not open or inspect an in-memory input.
    #[error("Failed to open input: {0}")]
    InputOpen(String),

    /// The input has no video stream.
    #[error("No video stream found")]
    NoVideoStream,

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// FFmpeg filter graph setup or processing failed.
    #[error("Filter graph error: {0}")]
    FilterGraphError(String),

    /// GIF encoding failed.
    #[error("GIF encoding error: {0}")]
    GifEncodeError(String),

    /// Still-image (thumbnail) encoding failed.
    #[error("Image encoding error: {0}")]
    ImageEncodeError(String),

    /// The encoded output does not fit in the caller's output buffer.
    #[error("Encoded output is {required} bytes but the output buffer holds {capacity}")]
    OutputTooSmall {
        /// Size of the encoded output.
        required: usize,
        /// Size of the output buffer.
        capacity: usize,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// The conversion did not finish before the deadline.
    #[cfg(feature = "async")]
    #[error("Conversion timed out after {0:?}")]
    Timeout(Duration),

    /// The blocking conversion task panicked or was cancelled.
    #[cfg(feature = "async")]
    #[error("Conversion task failed: {0}")]
    TaskFailed(String),
}

impl From<FfmpegError> for GifGenError {
    fn from(error: FfmpegError) -> Self {
        GifGenError::FfmpegError(error.to_string())
    }
}

impl From<image::ImageError> for GifGenError {
    fn from(error: image::ImageError) -> Self {
        GifGenError::ImageEncodeError(error.to_string())
    }
}
