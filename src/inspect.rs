//! Inspecting in-memory media.
//!
//! [`inspect`] opens a buffer, reads its stream table and closes the demuxer
//! again. [`dump_info`] additionally logs that table and decodes the whole
//! video stream, which is a quick way to check a clip decodes cleanly.
//!
//! # Example
//!
//! ```no_run
//! let video = std::fs::read("input.h264")?;
//! let frames = gifgen::dump_info(&video)?;
//! println!("{frames} frames decoded");
//! # Ok::<(), gifgen::GifGenError>(())
//! ```

use std::ffi::c_int;
use std::time::Duration;

use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::Stream;
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::media::Type;

use crate::conversion::rational_to_frames_per_second;
use crate::error::GifGenError;
use crate::memory_input::MemoryInput;
use crate::metadata::{AudioMetadata, MediaMetadata, StreamInfo, VideoMetadata};
use crate::native::{STATUS_OK, status_for};

/// Decoded frames between two progress lines in [`dump_info`].
pub const DUMP_PROGRESS_INTERVAL: u64 = 100;

/// Describe the media held in `data`.
///
/// # Errors
///
/// [`GifGenError::EmptyInput`] or [`GifGenError::InputOpen`] when the buffer
/// cannot be opened; FFmpeg errors while reading codec parameters.
pub fn inspect(data: &[u8]) -> Result<MediaMetadata, GifGenError> {
    let input = MemoryInput::open(data)?;
    read_metadata(&input)
}

/// Log the stream table of `data`, then decode its best video stream.
///
/// Each stream is logged at info level, followed by the video frame rate and
/// a line every [`DUMP_PROGRESS_INTERVAL`] decoded frames. Returns how many
/// video frames were decoded.
///
/// # Errors
///
/// Everything [`inspect`] reports, [`GifGenError::NoVideoStream`] when there is
/// nothing to decode and [`GifGenError::VideoDecodeError`] on a corrupt
/// packet.
pub fn dump_info(data: &[u8]) -> Result<u64, GifGenError> {
    let mut input = MemoryInput::open(data)?;
    let metadata = read_metadata(&input)?;

    for stream in &metadata.streams {
        log::info!(
            "stream index={}, type={}, codec id={}",
            stream.index,
            stream.media_type,
            stream.codec_id
        );
        match (&stream.decoder_name, &stream.decoder_long_name) {
            (Some(name), Some(long_name)) => log::info!("codec name={name}\t{long_name}"),
            _ => log::warn!("No decoder for stream {}", stream.index),
        }
    }
    if let Some(video) = &metadata.video {
        log::info!("video framerate={:.3}", video.frames_per_second);
    }

    let video_index = input
        .streams()
        .best(Type::Video)
        .map(|stream| stream.index())
        .ok_or(GifGenError::NoVideoStream)?;
    let mut decoder = video_decoder(&input, video_index)?;
    let mut decoded_frame = VideoFrame::empty();
    let mut decoded: u64 = 0;

    let mut drain = |decoder: &mut ffmpeg_next::decoder::Video| -> Result<(), GifGenError> {
        while crate::converter::frame_received(decoder.receive_frame(&mut decoded_frame))? {
            decoded += 1;
            if decoded % DUMP_PROGRESS_INTERVAL == 0 {
                log::info!("decoded {decoded} video frames");
            }
        }
        Ok(())
    };

    for (stream, packet) in input.packets() {
        if stream.index() != video_index {
            continue;
        }
        decoder.send_packet(&packet).map_err(|e| {
            GifGenError::VideoDecodeError(format!("Error sending a packet for decoding: {e}"))
        })?;
        drain(&mut decoder)?;
    }
    let _ = decoder.send_eof();
    drain(&mut decoder)?;

    log::info!("decoded {decoded} video frames in total");
    Ok(decoded)
}

/// [`dump_info`] reduced to a status code.
pub fn dump_info_status(data: &[u8]) -> c_int {
    match dump_info(data) {
        Ok(_) => STATUS_OK,
        Err(error) => {
            log::warn!("dump info fail: {error}");
            status_for(&error)
        }
    }
}

pub(crate) fn video_decoder(
    input: &MemoryInput,
    index: usize,
) -> Result<ffmpeg_next::decoder::Video, GifGenError> {
    let stream = input.stream(index).ok_or(GifGenError::NoVideoStream)?;
    CodecContext::from_parameters(stream.parameters())?
        .decoder()
        .video()
        .map_err(|e| GifGenError::VideoDecodeError(format!("Could not open codec: {e}")))
}

fn read_metadata(input: &MemoryInput) -> Result<MediaMetadata, GifGenError> {
    let duration = if input.duration() > 0 {
        Duration::from_micros(input.duration() as u64)
    } else {
        Duration::ZERO
    };

    let streams: Vec<StreamInfo> = input.streams().map(|stream| stream_info(&stream)).collect();

    let video = match input.streams().best(Type::Video) {
        Some(stream) => Some(video_metadata(&stream)?),
        None => None,
    };
    let audio = match input.streams().best(Type::Audio) {
        Some(stream) => Some(audio_metadata(&stream)?),
        None => None,
    };

    Ok(MediaMetadata {
        video,
        audio,
        duration,
        format: input.format().name().to_string(),
        streams,
    })
}

fn stream_info(stream: &Stream) -> StreamInfo {
    let parameters = stream.parameters();
    let (decoder_name, decoder_long_name) = match ffmpeg_next::decoder::find(parameters.id()) {
        Some(codec) => (
            Some(codec.name().to_string()),
            Some(codec.description().to_string()),
        ),
        None => (None, None),
    };
    StreamInfo {
        index: stream.index(),
        media_type: media_type_name(parameters.medium()).to_string(),
        codec_id: format!("{:?}", parameters.id()),
        decoder_name,
        decoder_long_name,
    }
}

fn video_metadata(stream: &Stream) -> Result<VideoMetadata, GifGenError> {
    let decoder = CodecContext::from_parameters(stream.parameters())?
        .decoder()
        .video()?;
    let frames_per_second = rational_to_frames_per_second(stream.avg_frame_rate())
        .or_else(|| rational_to_frames_per_second(stream.rate()))
        .unwrap_or(0.0);

    Ok(VideoMetadata {
        width: decoder.width(),
        height: decoder.height(),
        frames_per_second,
        codec: codec_name(stream),
    })
}

fn audio_metadata(stream: &Stream) -> Result<AudioMetadata, GifGenError> {
    let decoder = CodecContext::from_parameters(stream.parameters())?
        .decoder()
        .audio()?;

    Ok(AudioMetadata {
        sample_rate: decoder.rate(),
        channels: decoder.channels(),
        codec: codec_name(stream),
        bit_rate: decoder.bit_rate() as u64,
    })
}

fn codec_name(stream: &Stream) -> String {
    ffmpeg_next::decoder::find(stream.parameters().id())
        .map(|codec| codec.name().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn media_type_name(medium: Type) -> &'static str {
    match medium {
        Type::Video => "video",
        Type::Audio => "audio",
        Type::Data => "data",
        Type::Subtitle => "subtitle",
        Type::Attachment => "attachment",
        Type::Unknown => "unknown",
    }
}
