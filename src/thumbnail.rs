//! Still thumbnails of the first video frame.
//!
//! The input is opened with a demuxer, so any container FFmpeg recognises
//! works, raw H.264 included. The first decoded frame is scaled to the
//! requested width, keeping the aspect ratio, and encoded as JPEG or PNG with
//! the `image` crate.

use std::ffi::c_int;
use std::io::Cursor;

use ffmpeg_next::format::Pixel;
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::media::Type;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use image::{DynamicImage, ImageFormat, RgbImage};

use crate::conversion::frame_to_buffer;
use crate::converter::{copy_into, frame_received};
use crate::error::GifGenError;
use crate::inspect::video_decoder;
use crate::memory_input::MemoryInput;
use crate::native::{STATUS_OK, status_for};

/// Width for callers without a preference.
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 320;

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailFormat {
    Jpeg,
    Png,
}

impl ThumbnailFormat {
    /// Resolve a format name or a file name by its extension.
    ///
    /// Accepts `jpg`, `jpeg` and `png` in any case, alone or after the last
    /// `.` of a file name.
    ///
    /// ```
    /// use gifgen::ThumbnailFormat;
    ///
    /// assert_eq!(ThumbnailFormat::from_name("thumb.PNG"), Some(ThumbnailFormat::Png));
    /// assert_eq!(ThumbnailFormat::from_name("jpg"), Some(ThumbnailFormat::Jpeg));
    /// assert_eq!(ThumbnailFormat::from_name("bmp"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let extension = name.rsplit('.').next().unwrap_or(name);
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// Encode the first video frame of `input` as a `width`-pixel-wide image.
///
/// The height is `width * source_height / source_width`, at least 1.
///
/// # Errors
///
/// - [`GifGenError::InvalidArgument`] if `width` is zero.
/// - [`GifGenError::EmptyInput`] / [`GifGenError::InputOpen`] if the input
///   cannot be opened.
/// - [`GifGenError::NoVideoStream`] if there is no video.
/// - [`GifGenError::NoFrames`] if the video yields no frame.
/// - [`GifGenError::ImageEncodeError`] if the image cannot be encoded.
///
/// # Example
///
/// ```no_run
/// use gifgen::{ThumbnailFormat, render_thumbnail};
///
/// let video = std::fs::read("input.h264")?;
/// let png = render_thumbnail(ThumbnailFormat::Png, 320, &video)?;
/// std::fs::write("thumb.png", png)?;
/// # Ok::<(), gifgen::GifGenError>(())
/// ```
pub fn render_thumbnail(
    format: ThumbnailFormat,
    width: u32,
    input: &[u8],
) -> Result<Vec<u8>, GifGenError> {
    if width == 0 {
        return Err(GifGenError::InvalidArgument(
            "thumbnail width must be positive".to_string(),
        ));
    }

    let frame = first_video_frame(input)?;
    let height = scaled_height(width, frame.width(), frame.height());
    log::debug!(
        "Thumbnail {}x{} -> {width}x{height} as {format:?}",
        frame.width(),
        frame.height()
    );

    let mut scaler = ScalingContext::get(
        frame.format(),
        frame.width(),
        frame.height(),
        Pixel::RGB24,
        width,
        height,
        ScalingFlags::BILINEAR,
    )?;
    let mut rgb_frame = VideoFrame::empty();
    scaler.run(&frame, &mut rgb_frame)?;

    let pixels = frame_to_buffer(&rgb_frame, width, height, 3);
    let image = RgbImage::from_raw(width, height, pixels).ok_or_else(|| {
        GifGenError::ImageEncodeError("Scaled frame has an unexpected size".to_string())
    })?;

    let mut encoded = Vec::new();
    DynamicImage::ImageRgb8(image).write_to(&mut Cursor::new(&mut encoded), format.image_format())?;
    Ok(encoded)
}

/// Thumbnail generation under the native buffer/length/status contract.
///
/// `format_name` goes through [`ThumbnailFormat::from_name`]. On success the
/// image is copied to the start of `output`, its length stored in
/// `output_size` and [`STATUS_OK`] returned. An unknown format or a
/// non-positive width yields
/// [`STATUS_INVALID_ARGUMENT`](crate::STATUS_INVALID_ARGUMENT), an image
/// larger than `output` yields
/// [`STATUS_OUTPUT_TOO_SMALL`](crate::STATUS_OUTPUT_TOO_SMALL).
pub fn gen_thumbnail(
    format_name: &str,
    width: c_int,
    input: &[u8],
    output: &mut [u8],
    output_size: &mut c_int,
) -> c_int {
    let written = thumbnail_arguments(format_name, width)
        .and_then(|(format, width)| render_thumbnail(format, width, input))
        .and_then(|image| copy_into(&image, output));

    match written {
        Ok(length) => {
            *output_size = length;
            STATUS_OK
        }
        Err(error) => {
            log::warn!("generate thumbnail fail: {error}");
            status_for(&error)
        }
    }
}

fn thumbnail_arguments(
    format_name: &str,
    width: c_int,
) -> Result<(ThumbnailFormat, u32), GifGenError> {
    let format = ThumbnailFormat::from_name(format_name).ok_or_else(|| {
        GifGenError::InvalidArgument(format!("unsupported thumbnail format {format_name:?}"))
    })?;
    let width = u32::try_from(width)
        .ok()
        .filter(|&width| width > 0)
        .ok_or_else(|| GifGenError::InvalidArgument(format!("invalid thumbnail width {width}")))?;
    Ok((format, width))
}

fn scaled_height(width: u32, source_width: u32, source_height: u32) -> u32 {
    if source_width == 0 {
        return width;
    }
    let height = u64::from(width) * u64::from(source_height) / u64::from(source_width);
    u32::try_from(height).unwrap_or(u32::MAX).max(1)
}

fn first_video_frame(input: &[u8]) -> Result<VideoFrame, GifGenError> {
    let mut input = MemoryInput::open(input)?;
    let video_index = input
        .streams()
        .best(Type::Video)
        .map(|stream| stream.index())
        .ok_or(GifGenError::NoVideoStream)?;
    let mut decoder = video_decoder(&input, video_index)?;
    let mut frame = VideoFrame::empty();

    for (stream, packet) in input.packets() {
        if stream.index() != video_index {
            continue;
        }
        decoder.send_packet(&packet).map_err(|e| {
            GifGenError::VideoDecodeError(format!("Error sending a packet for decoding: {e}"))
        })?;
        if frame_received(decoder.receive_frame(&mut frame))? {
            return Ok(frame);
        }
    }

    let _ = decoder.send_eof();
    if frame_received(decoder.receive_frame(&mut frame))? {
        return Ok(frame);
    }
    Err(GifGenError::NoFrames)
}
