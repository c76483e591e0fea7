//! C ABI for hosts that cannot link Rust directly.
//!
//! The declarations live in `include/gifgen.h`.

use std::ffi::{CStr, CString, c_char, c_int, c_void};
use std::sync::OnceLock;

use crate::converter::FfmpegConverter;
use crate::log_sink::{set_log_sink, set_log_sink_fn};
use crate::native::{NativeConverter, STATUS_INVALID_ARGUMENT};
use crate::inspect::dump_info_status;
use crate::thumbnail::gen_thumbnail;

/// Log handler installed through [`gifgen_set_log_callback`].
pub type GifgenLogCallback = unsafe extern "C" fn(line: *const c_char);

static CONVERTER: OnceLock<FfmpegConverter> = OnceLock::new();

/// Convert `input_size` bytes at `input` into a GIF written to `output`.
///
/// Returns 0 and stores the GIF length in `*output_size` on success. Returns
/// a negative status on failure, including `-22` for null pointers or
/// non-positive sizes.
///
/// # Safety
///
/// `input` must be readable for `input_size` bytes, `output` writable for
/// `output_capacity` bytes and `output_size` writable, for the whole call.
/// The two buffers must not overlap.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gifgen_gen_gif(
    duration: c_int,
    rotation: c_int,
    input: *const c_void,
    input_size: c_int,
    output: *mut c_void,
    output_capacity: c_int,
    output_size: *mut c_int,
) -> c_int {
    if input.is_null() || output.is_null() || output_size.is_null() {
        return STATUS_INVALID_ARGUMENT;
    }
    if input_size <= 0 || output_capacity <= 0 {
        return STATUS_INVALID_ARGUMENT;
    }

    let (input, output, output_size) = unsafe {
        (
            std::slice::from_raw_parts(input.cast::<u8>(), input_size as usize),
            std::slice::from_raw_parts_mut(output.cast::<u8>(), output_capacity as usize),
            &mut *output_size,
        )
    };

    CONVERTER
        .get_or_init(FfmpegConverter::default)
        .gen_gif(duration, rotation, input, output, output_size)
}

/// Encode the first video frame of `input` as a `width`-pixel-wide image.
///
/// `format_name` is `"jpg"`, `"jpeg"`, `"png"` or a file name ending in one
/// of them. Returns 0 and stores the image length in `*output_size` on
/// success, a negative status otherwise.
///
/// # Safety
///
/// `format_name` must be a null-terminated string. The buffer rules of
/// [`gifgen_gen_gif`] apply to `input`, `output` and `output_size`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gifgen_gen_thumbnail(
    format_name: *const c_char,
    width: c_int,
    input: *const c_void,
    input_size: c_int,
    output: *mut c_void,
    output_capacity: c_int,
    output_size: *mut c_int,
) -> c_int {
    if format_name.is_null() || input.is_null() || output.is_null() || output_size.is_null() {
        return STATUS_INVALID_ARGUMENT;
    }
    if input_size <= 0 || output_capacity <= 0 {
        return STATUS_INVALID_ARGUMENT;
    }

    let (format_name, input, output, output_size) = unsafe {
        (
            CStr::from_ptr(format_name),
            std::slice::from_raw_parts(input.cast::<u8>(), input_size as usize),
            std::slice::from_raw_parts_mut(output.cast::<u8>(), output_capacity as usize),
            &mut *output_size,
        )
    };
    let Ok(format_name) = format_name.to_str() else {
        return STATUS_INVALID_ARGUMENT;
    };

    gen_thumbnail(format_name, width, input, output, output_size)
}

/// Log the streams of `input` and decode its video. Returns 0 on success.
///
/// # Safety
///
/// `input` must be readable for `input_size` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gifgen_dump_info(input: *const c_void, input_size: c_int) -> c_int {
    if input.is_null() || input_size <= 0 {
        return STATUS_INVALID_ARGUMENT;
    }
    let input = unsafe { std::slice::from_raw_parts(input.cast::<u8>(), input_size as usize) };
    dump_info_status(input)
}

/// Route forwarded FFmpeg log lines to `callback`.
///
/// Each line arrives null-terminated, already prefixed, and is only valid
/// for the duration of the call. Passing null restores printing to standard
/// output. The callback may run on FFmpeg worker threads.
#[unsafe(no_mangle)]
pub extern "C" fn gifgen_set_log_callback(callback: Option<GifgenLogCallback>) {
    let Some(callback) = callback else {
        set_log_sink(None);
        return;
    };

    set_log_sink_fn(move |line| {
        // Lines from FFmpeg cannot contain NUL, but a Rust caller of
        // forward_native_log can.
        let Ok(line) = CString::new(line) else {
            return;
        };
        unsafe { callback(line.as_ptr()) };
    });
}
