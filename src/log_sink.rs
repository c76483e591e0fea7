//! Process-wide destination for FFmpeg diagnostic lines.
//!
//! FFmpeg reports warnings and errors through a C callback that may fire
//! from any of its worker threads. [`forward_native_log`] filters those lines
//! by severity and hands the survivors to a single replaceable sink. Until a
//! sink is configured, lines are printed to standard output.
//!
//! # Example
//!
//! ```no_run
//! gifgen::set_log_sink_fn(|line| log::warn!("{}", line.trim_end()));
//!
//! let video = std::fs::read("input.h264")?;
//! let gif = gifgen::gen_gif(5, 90, &video)?;
//!
//! // Back to printing on stdout.
//! gifgen::set_log_sink(None);
//! # Ok::<(), gifgen::GifGenError>(())
//! ```

use std::sync::{Arc, PoisonError, RwLock};

/// Lines with a severity numerically at or below this value are forwarded.
///
/// Matches FFmpeg's `AV_LOG_WARNING`; errors, fatal and panic levels are
/// smaller numbers.
pub const LOG_FORWARD_THRESHOLD: i32 = 32;

/// Prefix prepended to every forwarded line.
pub const LOG_PREFIX: &str = "ffmpeg log:";

/// A handler receiving formatted FFmpeg log lines.
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

static LOG_SINK: RwLock<Option<LogSink>> = RwLock::new(None);

/// Replace the process-wide log sink.
///
/// Passing `None` restores the default sink, which prints to standard
/// output. The last call wins.
pub fn set_log_sink(sink: Option<LogSink>) {
    let mut slot = LOG_SINK.write().unwrap_or_else(PoisonError::into_inner);
    *slot = sink;
}

/// Replace the process-wide log sink with a closure.
pub fn set_log_sink_fn<F>(sink: F)
where
    F: Fn(&str) + Send + Sync + 'static,
{
    set_log_sink(Some(Arc::new(sink)));
}

/// Deliver one native log line to the current sink.
///
/// Lines above [`LOG_FORWARD_THRESHOLD`] are dropped. Accepted lines are
/// formatted as `"ffmpeg log:<message>\n"` and handed to the sink exactly
/// once. Safe to call concurrently from any thread.
pub fn forward_native_log(level: i32, message: &str) {
    if level > LOG_FORWARD_THRESHOLD {
        return;
    }

    let line = format_line(message);

    // Clone out of the lock so a sink may reconfigure logging itself.
    let sink = LOG_SINK
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    match sink {
        Some(sink) => sink(&line),
        None => print!("{line}"),
    }
}

fn format_line(message: &str) -> String {
    format!("{LOG_PREFIX}{message}\n")
}
