//! Internal utility functions.
//!
//! Helpers for pixel-data copying and frame-rate arithmetic shared by the
//! converter and its filter graph.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy pixel data from an FFmpeg video frame into a tightly-packed buffer.
///
/// `bytes_per_pixel` is the number of bytes per pixel for the frame format
/// (4 for RGBA).
pub fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}

/// Frames per second described by a rational, if it is usable.
pub fn rational_to_frames_per_second(rate: Rational) -> Option<f64> {
    if rate.numerator() <= 0 || rate.denominator() <= 0 {
        return None;
    }
    Some(rate.numerator() as f64 / rate.denominator() as f64)
}

/// Keep one source frame out of this many to reach `target_frames_per_second`.
///
/// Never less than 1.
pub fn sampling_step(source_frames_per_second: f64, target_frames_per_second: u32) -> u64 {
    let target = f64::from(target_frames_per_second.max(1));
    ((source_frames_per_second / target) as u64).max(1)
}

/// Number of source frames covered by `duration_seconds`.
///
/// `None` when the duration is zero or negative, meaning the whole clip.
pub fn frame_limit(duration_seconds: i32, source_frames_per_second: f64) -> Option<u64> {
    if duration_seconds <= 0 {
        return None;
    }
    Some(((f64::from(duration_seconds) * source_frames_per_second).ceil() as u64).max(1))
}

/// Delay between GIF frames in hundredths of a second.
pub fn frame_delay(frames_per_second: u32) -> u16 {
    (100 / frames_per_second.max(1)).clamp(1, u16::MAX as u32) as u16
}
