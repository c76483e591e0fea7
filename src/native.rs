//! The foreign-call contract between the binding layer and a converter.
//!
//! A converter receives the clip length and rotation, reads the whole input
//! buffer, writes an encoded GIF into the caller's output buffer and reports
//! how many bytes it wrote. Success is signalled by a zero status; any other
//! value is a failure whose meaning belongs to the converter.
//!
//! [`FfmpegConverter`](crate::FfmpegConverter) is the production
//! implementation. Tests substitute their own.

use std::ffi::c_int;
use std::sync::Arc;

use crate::error::GifGenError;

/// Conversion succeeded.
pub const STATUS_OK: c_int = 0;
/// A pointer or size handed across the C ABI was invalid (`AVERROR(EINVAL)`).
pub const STATUS_INVALID_ARGUMENT: c_int = -22;
/// The encoded GIF did not fit in the output buffer (`AVERROR(ENOSPC)`).
pub const STATUS_OUTPUT_TOO_SMALL: c_int = -28;
/// FFmpeg could not be initialised or failed outside decode/filter.
pub const STATUS_FFMPEG_FAILED: c_int = -1;
/// The input could not be parsed or decoded.
pub const STATUS_DECODE_FAILED: c_int = -2;
/// Decoding finished without producing a single frame.
pub const STATUS_NO_FRAMES: c_int = -3;
/// The rotate/scale filter graph failed.
pub const STATUS_FILTER_FAILED: c_int = -4;
/// The GIF or thumbnail encoder failed.
pub const STATUS_ENCODE_FAILED: c_int = -5;
/// The input holds no video stream.
pub const STATUS_NO_VIDEO_STREAM: c_int = -6;

/// A native video-to-GIF converter.
///
/// Mirrors the C entry point
/// `int gen_gif(int duration, int rotation, void *in, int in_size, void *out, int out_capacity, int *out_size)`.
pub trait NativeConverter {
    /// Convert `input` into a GIF written at the start of `output`.
    ///
    /// On success returns [`STATUS_OK`] and stores the number of bytes
    /// written in `output_size`. Any other return value is a failure, in
    /// which case `output_size` and `output` carry no meaning.
    fn gen_gif(
        &self,
        duration: c_int,
        rotation: c_int,
        input: &[u8],
        output: &mut [u8],
        output_size: &mut c_int,
    ) -> c_int;
}

impl<T: NativeConverter + ?Sized> NativeConverter for &T {
    fn gen_gif(
        &self,
        duration: c_int,
        rotation: c_int,
        input: &[u8],
        output: &mut [u8],
        output_size: &mut c_int,
    ) -> c_int {
        (**self).gen_gif(duration, rotation, input, output, output_size)
    }
}

impl<T: NativeConverter + ?Sized> NativeConverter for Box<T> {
    fn gen_gif(
        &self,
        duration: c_int,
        rotation: c_int,
        input: &[u8],
        output: &mut [u8],
        output_size: &mut c_int,
    ) -> c_int {
        (**self).gen_gif(duration, rotation, input, output, output_size)
    }
}

impl<T: NativeConverter + ?Sized> NativeConverter for Arc<T> {
    fn gen_gif(
        &self,
        duration: c_int,
        rotation: c_int,
        input: &[u8],
        output: &mut [u8],
        output_size: &mut c_int,
    ) -> c_int {
        (**self).gen_gif(duration, rotation, input, output, output_size)
    }
}

/// Reduce a converter error to the status code reported across the boundary.
pub(crate) fn status_for(error: &GifGenError) -> c_int {
    match error {
        GifGenError::EmptyInput | GifGenError::InvalidArgument(_) => STATUS_INVALID_ARGUMENT,
        GifGenError::OutputTooSmall { .. } => STATUS_OUTPUT_TOO_SMALL,
        GifGenError::VideoDecodeError(_) | GifGenError::InputOpen(_) => STATUS_DECODE_FAILED,
        GifGenError::NoVideoStream => STATUS_NO_VIDEO_STREAM,
        GifGenError::NoFrames => STATUS_NO_FRAMES,
        GifGenError::FilterGraphError(_) => STATUS_FILTER_FAILED,
        GifGenError::GifEncodeError(_) | GifGenError::ImageEncodeError(_) => STATUS_ENCODE_FAILED,
        GifGenError::Conversion { code } => *code,
        _ => STATUS_FFMPEG_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_maps_to_a_non_zero_status() {
        let errors = [
            GifGenError::EmptyInput,
            GifGenError::NoFrames,
            GifGenError::VideoDecodeError("bad".to_string()),
            GifGenError::FilterGraphError("bad".to_string()),
            GifGenError::GifEncodeError("bad".to_string()),
            GifGenError::FfmpegError("bad".to_string()),
            GifGenError::InvalidArgument("bad".to_string()),
            GifGenError::InputOpen("bad".to_string()),
            GifGenError::NoVideoStream,
            GifGenError::ImageEncodeError("bad".to_string()),
            GifGenError::OutputTooSmall {
                required: 10,
                capacity: 5,
            },
        ];
        for error in &errors {
            assert_ne!(status_for(error), STATUS_OK, "{error}");
        }
    }

    #[test]
    fn output_too_small_maps_to_enospc() {
        let error = GifGenError::OutputTooSmall {
            required: 2,
            capacity: 1,
        };
        assert_eq!(status_for(&error), STATUS_OUTPUT_TOO_SMALL);
    }

    #[test]
    fn missing_video_stream_has_its_own_status() {
        assert_eq!(status_for(&GifGenError::NoVideoStream), STATUS_NO_VIDEO_STREAM);
        assert_eq!(
            status_for(&GifGenError::InputOpen("bad".to_string())),
            STATUS_DECODE_FAILED
        );
    }
}
