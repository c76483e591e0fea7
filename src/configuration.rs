//! Conversion configuration.
//!
//! [`ConversionOptions`] carries the settings the binding layer needs around
//! a native call. Converter-specific knobs (output width, GIF frame rate)
//! live in [`GifOptions`](crate::GifOptions).

use std::ffi::c_int;

/// Default clip length in seconds used by the CLI.
pub const DEFAULT_DURATION_SECONDS: i32 = 5;

/// Default rotation in degrees used by the CLI.
pub const DEFAULT_ROTATION_DEGREES: i32 = 90;

/// Default size of the working output buffer (1 MiB).
pub const DEFAULT_OUTPUT_CAPACITY: usize = 1 << 20;

/// Settings for [`GifGenerator`](crate::GifGenerator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Size in bytes of the working buffer handed to the converter.
    ///
    /// A GIF larger than this cannot be produced. Clamped to `1..=i32::MAX`.
    pub output_capacity: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            output_capacity: DEFAULT_OUTPUT_CAPACITY,
        }
    }
}

impl ConversionOptions {
    /// Create options with the default 1 MiB working buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working buffer size.
    pub fn with_output_capacity(mut self, capacity: usize) -> Self {
        self.output_capacity = capacity.clamp(1, c_int::MAX as usize);
        self
    }
}
