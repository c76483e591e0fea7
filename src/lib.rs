//! # gifgen
//!
//! Convert in-memory video buffers into animated GIFs.
//!
//! `gifgen` hands a raw H.264 stream to FFmpeg, via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate, and returns
//! the first few seconds as a rotated, downscaled GIF. The conversion sits
//! behind the [`NativeConverter`] contract so callers and tests can swap the
//! FFmpeg pipeline for anything that honours the same buffer/status rules.
//!
//! ## Quick Start
//!
//! ```no_run
//! let video = std::fs::read("input.h264")?;
//!
//! // First 5 seconds, rotated 90 degrees.
//! let gif = gifgen::gen_gif(5, 90, &video)?;
//! std::fs::write("output.gif", gif)?;
//! # Ok::<(), gifgen::GifGenError>(())
//! ```
//!
//! ### Capturing FFmpeg diagnostics
//!
//! ```no_run
//! gifgen::set_log_sink_fn(|line| eprint!("{line}"));
//! ```
//!
//! ## Features
//!
//! - **Binding layer**: [`GifGenerator`] owns the working buffer, checks the
//!   reported length and maps non-zero status codes to errors
//! - **FFmpeg converter**: parse, decode, sample to a target frame rate,
//!   rotate, scale, and encode with the `gif` crate
//! - **Log forwarding**: FFmpeg warnings and errors reach a replaceable,
//!   thread-safe sink
//! - **Thumbnails and stream inspection**: [`render_thumbnail`] encodes the first
//!   frame as JPEG/PNG, [`inspect()`] and [`dump_info`] describe any container
//!   FFmpeg can demux from memory
//! - **C ABI**: `gifgen_gen_gif`, `gifgen_gen_thumbnail`, `gifgen_dump_info`
//!   and `gifgen_set_log_callback` for non-Rust hosts (`include/gifgen.h`)
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `async` | `convert_blocking` and `convert_with_timeout` via Tokio |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

#[cfg(feature = "async")]
pub mod background;
pub mod binding;
pub mod capi;
pub mod configuration;
mod conversion;
pub mod converter;
pub mod error;
pub mod ffmpeg;
mod filter;
pub mod gif;
pub mod inspect;
pub mod log_sink;
mod memory_input;
pub mod metadata;
pub mod native;
mod parser;
pub mod thumbnail;

#[cfg(feature = "async")]
pub use background::{convert_blocking, convert_with_timeout};
pub use binding::{GifGenerator, gen_gif};
pub use configuration::{
    ConversionOptions, DEFAULT_DURATION_SECONDS, DEFAULT_OUTPUT_CAPACITY,
    DEFAULT_ROTATION_DEGREES,
};
pub use converter::FfmpegConverter;
pub use error::GifGenError;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, install_log_callback, set_ffmpeg_log_level};
pub use crate::gif::GifOptions;
pub use inspect::{DUMP_PROGRESS_INTERVAL, dump_info, dump_info_status, inspect};
pub use log_sink::{
    LOG_FORWARD_THRESHOLD, LOG_PREFIX, LogSink, forward_native_log, set_log_sink, set_log_sink_fn,
};
pub use metadata::{AudioMetadata, MediaMetadata, StreamInfo, VideoMetadata};
pub use native::{
    NativeConverter, STATUS_DECODE_FAILED, STATUS_ENCODE_FAILED, STATUS_FFMPEG_FAILED,
    STATUS_FILTER_FAILED, STATUS_INVALID_ARGUMENT, STATUS_NO_FRAMES, STATUS_NO_VIDEO_STREAM,
    STATUS_OK, STATUS_OUTPUT_TOO_SMALL,
};
pub use thumbnail::{DEFAULT_THUMBNAIL_WIDTH, ThumbnailFormat, gen_thumbnail, render_thumbnail};
