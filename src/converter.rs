//! FFmpeg-backed [`NativeConverter`].
//!
//! [`FfmpegConverter`] treats the input as an H.264 Annex-B elementary
//! stream. Packets are cut with FFmpeg's parser and decoded; the first
//! decoded frame fixes the source frame rate, the sampling step and the
//! filter graph. Sampled frames are rotated, scaled to the configured width,
//! converted to RGBA and finally encoded as an animated GIF.
//!
//! # Example
//!
//! ```no_run
//! use gifgen::{FfmpegConverter, GifOptions};
//!
//! let converter = FfmpegConverter::new(GifOptions::default());
//! let video = std::fs::read("input.h264")?;
//! let gif = converter.render(5, 90, &video)?;
//! # Ok::<(), gifgen::GifGenError>(())
//! ```

use std::ffi::c_int;

use ffmpeg_next::codec::Id;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::decoder::Video as VideoDecoder;
use ffmpeg_next::frame::Video as VideoFrame;
use image::RgbaImage;

use crate::conversion::{frame_limit, rational_to_frames_per_second, sampling_step};
use crate::error::GifGenError;
use crate::filter::RotateScaleFilter;
use crate::gif::{GifOptions, encode_gif_to_memory};
use crate::native::{NativeConverter, STATUS_OK, status_for};
use crate::parser::{ElementaryStreamParser, padded_copy};

/// Production converter driving FFmpeg.
#[derive(Debug, Clone, Default)]
pub struct FfmpegConverter {
    options: GifOptions,
}

impl FfmpegConverter {
    /// Create a converter producing GIFs shaped by `options`.
    pub fn new(options: GifOptions) -> Self {
        Self { options }
    }

    /// The GIF options in use.
    pub fn options(&self) -> &GifOptions {
        &self.options
    }

    /// Convert `input` and return the encoded GIF.
    ///
    /// `duration` limits the clip to its first `duration` seconds; zero or
    /// negative keeps the whole clip. `rotation` is in degrees, clockwise;
    /// zero skips the rotate filter.
    ///
    /// # Errors
    ///
    /// - [`GifGenError::EmptyInput`] if `input` is empty.
    /// - [`GifGenError::VideoDecodeError`] if the stream cannot be parsed or
    ///   decoded.
    /// - [`GifGenError::NoFrames`] if nothing was decoded.
    /// - [`GifGenError::FilterGraphError`] / [`GifGenError::GifEncodeError`]
    ///   from the later stages.
    pub fn render(
        &self,
        duration: i32,
        rotation: i32,
        input: &[u8],
    ) -> Result<Vec<u8>, GifGenError> {
        if input.is_empty() {
            return Err(GifGenError::EmptyInput);
        }
        crate::ffmpeg::initialize()?;

        let frames = self.decode_frames(duration, rotation, input)?;
        log::debug!("Sampled {} frames from {} input bytes", frames.len(), input.len());

        encode_gif_to_memory(&frames, &self.options)
    }

    fn decode_frames(
        &self,
        duration: i32,
        rotation: i32,
        input: &[u8],
    ) -> Result<Vec<RgbaImage>, GifGenError> {
        let codec = ffmpeg_next::decoder::find(Id::H264).ok_or_else(|| {
            GifGenError::VideoDecodeError("H.264 decoder not available".to_string())
        })?;
        let mut decoder = CodecContext::new_with_codec(codec)
            .decoder()
            .video()
            .map_err(|e| GifGenError::VideoDecodeError(format!("Could not open codec: {e}")))?;
        let mut parser = ElementaryStreamParser::new(Id::H264)?;
        let mut collector = FrameCollector::new(&self.options, duration, rotation);

        let padded = padded_copy(input);
        let mut remaining = &padded[..input.len()];

        while !remaining.is_empty() && !collector.is_complete() {
            let (consumed, packet) = parser.parse(&mut decoder, remaining)?;
            remaining = &remaining[consumed..];

            if let Some(packet) = packet {
                decoder.send_packet(&packet).map_err(|e| {
                    GifGenError::VideoDecodeError(format!("Error sending a packet for decoding: {e}"))
                })?;
                collector.receive_from(&mut decoder)?;
            }
        }

        if !collector.is_complete() {
            if let Some(packet) = parser.flush(&mut decoder)? {
                decoder.send_packet(&packet).map_err(|e| {
                    GifGenError::VideoDecodeError(format!("Error sending a packet for decoding: {e}"))
                })?;
                collector.receive_from(&mut decoder)?;
            }
            let _ = decoder.send_eof();
            collector.receive_from(&mut decoder)?;
        }

        collector.finish()
    }
}

impl NativeConverter for FfmpegConverter {
    fn gen_gif(
        &self,
        duration: c_int,
        rotation: c_int,
        input: &[u8],
        output: &mut [u8],
        output_size: &mut c_int,
    ) -> c_int {
        let written = self
            .render(duration, rotation, input)
            .and_then(|gif| copy_into(&gif, output));

        match written {
            Ok(length) => {
                *output_size = length;
                STATUS_OK
            }
            Err(error) => {
                log::warn!("GIF generation failed: {error}");
                status_for(&error)
            }
        }
    }
}

pub(crate) fn copy_into(gif: &[u8], output: &mut [u8]) -> Result<c_int, GifGenError> {
    let too_small = || GifGenError::OutputTooSmall {
        required: gif.len(),
        capacity: output.len(),
    };
    if gif.len() > output.len() {
        return Err(too_small());
    }
    let length = c_int::try_from(gif.len()).map_err(|_| too_small())?;
    output[..gif.len()].copy_from_slice(gif);
    Ok(length)
}

/// `Ok(false)` once the decoder is drained (`EAGAIN`/EOF); real decode errors
/// fail the conversion.
pub(crate) fn frame_received(result: Result<(), ffmpeg_next::Error>) -> Result<bool, GifGenError> {
    match result {
        Ok(()) => Ok(true),
        Err(ffmpeg_next::Error::Eof) => Ok(false),
        Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::error::EAGAIN => Ok(false),
        Err(error) => Err(GifGenError::VideoDecodeError(format!(
            "Error during decoding: {error}"
        ))),
    }
}

/// Decoded-frame bookkeeping: sampling, duration cut-off and filtering.
struct FrameCollector<'a> {
    options: &'a GifOptions,
    duration: i32,
    rotation: i32,
    decoded_frame: VideoFrame,
    decoded_count: u64,
    sampling: Option<Sampling>,
    frames: Vec<RgbaImage>,
    complete: bool,
}

/// Parameters fixed by the first decoded frame.
struct Sampling {
    step: u64,
    limit: Option<u64>,
    filter: RotateScaleFilter,
}

impl<'a> FrameCollector<'a> {
    fn new(options: &'a GifOptions, duration: i32, rotation: i32) -> Self {
        Self {
            options,
            duration,
            rotation,
            decoded_frame: VideoFrame::empty(),
            decoded_count: 0,
            sampling: None,
            frames: Vec::new(),
            complete: false,
        }
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn receive_from(&mut self, decoder: &mut VideoDecoder) -> Result<(), GifGenError> {
        while !self.complete && frame_received(decoder.receive_frame(&mut self.decoded_frame))? {
            self.accept(decoder)?;
        }
        Ok(())
    }

    fn accept(&mut self, decoder: &VideoDecoder) -> Result<(), GifGenError> {
        let index = self.decoded_count;
        self.decoded_count += 1;

        if self.sampling.is_none() {
            self.sampling = Some(self.start_sampling(decoder)?);
        }
        let Some(sampling) = self.sampling.as_mut() else {
            return Ok(());
        };

        if sampling.limit.is_some_and(|limit| index >= limit) {
            self.complete = true;
            return Ok(());
        }
        if index % sampling.step != 0 {
            return Ok(());
        }

        self.decoded_frame.set_pts(Some(index as i64));
        sampling.filter.push(&self.decoded_frame, &mut self.frames)
    }

    fn start_sampling(&self, decoder: &VideoDecoder) -> Result<Sampling, GifGenError> {
        let source_rate = decoder
            .frame_rate()
            .and_then(rational_to_frames_per_second)
            .unwrap_or(f64::from(self.options.fallback_source_frame_rate));
        let step = sampling_step(source_rate, self.options.frame_rate);
        let limit = frame_limit(self.duration, source_rate);

        log::debug!(
            "Source {}x{} at {:.2} fps: keeping every {} frame(s), limit {:?}",
            self.decoded_frame.width(),
            self.decoded_frame.height(),
            source_rate,
            step,
            limit,
        );

        let filter = RotateScaleFilter::new(
            &self.decoded_frame,
            source_rate.round() as u32,
            self.rotation,
            self.options.width,
        )?;
        Ok(Sampling {
            step,
            limit,
            filter,
        })
    }

    fn finish(mut self) -> Result<Vec<RgbaImage>, GifGenError> {
        if let Some(sampling) = self.sampling.as_mut() {
            sampling.filter.flush(&mut self.frames)?;
        }
        if self.frames.is_empty() {
            return Err(GifGenError::NoFrames);
        }
        Ok(self.frames)
    }
}
