//! Async conversion on a blocking worker.
//!
//! A native conversion cannot be interrupted once it starts. These helpers
//! move it onto `tokio::task::spawn_blocking` so an async caller can await
//! it, or stop waiting after a deadline. On timeout the worker keeps running
//! to completion in the background and its result is discarded.
//!
//! This module is available when the `async` feature is enabled.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use gifgen::{GifGenError, GifGenerator};
//!
//! # async fn example() -> Result<(), GifGenError> {
//! let generator = Arc::new(GifGenerator::with_defaults());
//! let video = std::fs::read("input.h264")?;
//! let gif = gifgen::convert_with_timeout(generator, 5, 90, video, Duration::from_secs(30)).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::binding::GifGenerator;
use crate::error::GifGenError;
use crate::native::NativeConverter;

/// Run [`GifGenerator::convert`] on a blocking worker thread.
///
/// # Errors
///
/// Everything `convert` returns, plus [`GifGenError::TaskFailed`] if the
/// worker panicked.
pub async fn convert_blocking<C>(
    generator: Arc<GifGenerator<C>>,
    duration: i32,
    rotation: i32,
    input: Vec<u8>,
) -> Result<Vec<u8>, GifGenError>
where
    C: NativeConverter + Send + Sync + 'static,
{
    tokio::task::spawn_blocking(move || generator.convert(duration, rotation, &input))
        .await
        .map_err(|error| GifGenError::TaskFailed(error.to_string()))?
}

/// Like [`convert_blocking`], but give up waiting after `timeout`.
///
/// # Errors
///
/// [`GifGenError::Timeout`] when the deadline passes first. The native call
/// is abandoned, not cancelled.
pub async fn convert_with_timeout<C>(
    generator: Arc<GifGenerator<C>>,
    duration: i32,
    rotation: i32,
    input: Vec<u8>,
    timeout: Duration,
) -> Result<Vec<u8>, GifGenError>
where
    C: NativeConverter + Send + Sync + 'static,
{
    tokio::time::timeout(
        timeout,
        convert_blocking(generator, duration, rotation, input),
    )
    .await
    .unwrap_or_else(|_| {
        log::warn!("Conversion abandoned after {timeout:?}");
        Err(GifGenError::Timeout(timeout))
    })
}
