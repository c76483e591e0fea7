//! FFmpeg initialisation, log level, and the native log hook.
//!
//! FFmpeg has its own logging system, separate from the Rust
//! [`log`](https://crates.io/crates/log) crate. `gifgen` replaces FFmpeg's
//! default printer with a callback that formats each line and hands it to
//! [`forward_native_log`](crate::forward_native_log), so warnings and errors
//! raised while decoding end up in the process log sink.
//!
//! # Example
//!
//! ```no_run
//! use gifgen::FfmpegLogLevel;
//!
//! // Stop FFmpeg from producing anything below errors.
//! gifgen::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! gifgen::install_log_callback();
//! ```

#[cfg(all(target_arch = "x86_64", unix))]
use std::ffi::{CStr, c_char, c_int, c_void};
use std::sync::Once;

use ffmpeg_next::util::log::Level;

use crate::error::GifGenError;
#[cfg(all(target_arch = "x86_64", unix))]
use crate::log_sink::{LOG_FORWARD_THRESHOLD, forward_native_log};

/// Size of the buffer a single native log line is formatted into.
#[cfg(all(target_arch = "x86_64", unix))]
const LOG_LINE_SIZE: usize = 1024;

static INSTALL_LOG_CALLBACK: Once = Once::new();

/// FFmpeg internal log verbosity level.
///
/// Maps directly to FFmpeg's `AV_LOG_*` constants.
///
/// # Ordering (most verbose → most quiet)
///
/// `Trace` > `Debug` > `Verbose` > `Info` > `Warning` > `Error` > `Fatal` > `Panic` > `Quiet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print no output at all.
    Quiet,
    /// Only log conditions the process cannot recover from.
    Panic,
    /// Only log unrecoverable errors.
    Fatal,
    /// Log recoverable errors.
    Error,
    /// Log warnings (default FFmpeg level).
    Warning,
    /// Log informational messages.
    Info,
    /// Log verbose informational messages.
    Verbose,
    /// Log debugging messages.
    Debug,
    /// Extremely verbose tracing output.
    Trace,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }

    fn from_ffmpeg_level(level: Level) -> Self {
        match level {
            Level::Quiet => FfmpegLogLevel::Quiet,
            Level::Panic => FfmpegLogLevel::Panic,
            Level::Fatal => FfmpegLogLevel::Fatal,
            Level::Error => FfmpegLogLevel::Error,
            Level::Warning => FfmpegLogLevel::Warning,
            Level::Info => FfmpegLogLevel::Info,
            Level::Verbose => FfmpegLogLevel::Verbose,
            Level::Debug => FfmpegLogLevel::Debug,
            Level::Trace => FfmpegLogLevel::Trace,
        }
    }

    /// Parse a level name as accepted on the command line.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" => Some(FfmpegLogLevel::Quiet),
            "panic" => Some(FfmpegLogLevel::Panic),
            "fatal" => Some(FfmpegLogLevel::Fatal),
            "error" => Some(FfmpegLogLevel::Error),
            "warning" | "warn" => Some(FfmpegLogLevel::Warning),
            "info" => Some(FfmpegLogLevel::Info),
            "verbose" => Some(FfmpegLogLevel::Verbose),
            "debug" => Some(FfmpegLogLevel::Debug),
            "trace" => Some(FfmpegLogLevel::Trace),
            _ => None,
        }
    }
}

/// Set the FFmpeg internal log verbosity level.
///
/// The log hook drops lines above this level as well as above
/// [`LOG_FORWARD_THRESHOLD`](crate::LOG_FORWARD_THRESHOLD), so lowering it also quietens the log sink.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

/// Get the current FFmpeg internal log verbosity level.
///
/// Returns `None` if the current level does not map to a known variant.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    ffmpeg_next::util::log::get_level()
        .ok()
        .map(FfmpegLogLevel::from_ffmpeg_level)
}

/// Register the `gifgen` log hook with FFmpeg.
///
/// Idempotent; only the first call touches FFmpeg. The hook needs the
/// System V `va_list` layout, so on other targets FFmpeg keeps its default
/// printer and nothing reaches the log sink.
pub fn install_log_callback() {
    INSTALL_LOG_CALLBACK.call_once(|| {
        log::debug!("Installing FFmpeg log callback");
        register_native_callback();
    });
}

/// Initialise FFmpeg and install the log hook.
pub(crate) fn initialize() -> Result<(), GifGenError> {
    ffmpeg_next::init()?;
    install_log_callback();
    Ok(())
}

#[cfg(all(target_arch = "x86_64", unix))]
fn register_native_callback() {
    unsafe {
        ffmpeg_sys_next::av_log_set_callback(Some(native_log_callback));
    }
}

#[cfg(not(all(target_arch = "x86_64", unix)))]
fn register_native_callback() {
    log::warn!("FFmpeg log forwarding is not supported on this target");
}

#[cfg(all(target_arch = "x86_64", unix))]
unsafe extern "C" fn native_log_callback(
    avcl: *mut c_void,
    level: c_int,
    fmt: *const c_char,
    vl: *mut ffmpeg_sys_next::__va_list_tag,
) {
    // FFmpeg only applies av_log_level inside its default callback.
    if level > LOG_FORWARD_THRESHOLD || fmt.is_null() {
        return;
    }
    if level > unsafe { ffmpeg_sys_next::av_log_get_level() } {
        return;
    }

    let mut buffer = [0 as c_char; LOG_LINE_SIZE];
    let mut print_prefix: c_int = 0;
    let message = unsafe {
        ffmpeg_sys_next::av_log_format_line(
            avcl,
            level,
            fmt,
            vl,
            buffer.as_mut_ptr(),
            LOG_LINE_SIZE as c_int,
            &mut print_prefix,
        );
        CStr::from_ptr(buffer.as_ptr()).to_string_lossy()
    };

    let message = message.strip_suffix('\n').unwrap_or(&message);
    if message.is_empty() {
        return;
    }

    forward_native_log(level, message);
}
