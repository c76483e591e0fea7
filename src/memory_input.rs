//! Demuxer input over an in-memory buffer.
//!
//! `ffmpeg-next` only opens inputs by URL, so [`MemoryInput`] builds the
//! `AVIOContext` itself: FFmpeg pulls bytes through [`read_packet`] and
//! [`seek_packet`] from a boxed cursor, then the opened
//! `AVFormatContext` is handed to `ffmpeg-next` as a regular
//! [`Input`](ffmpeg_next::format::context::Input).

use std::ffi::{c_int, c_void};
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::ops::{Deref, DerefMut};
use std::ptr;

use ffmpeg_next::format::context::Input;
use ffmpeg_sys_next::AVIOContext;

use crate::error::GifGenError;

/// Size of the buffer FFmpeg reads through.
const IO_BUFFER_SIZE: usize = 32 * 1024;

const SEEK_SET: c_int = 0;
const SEEK_CUR: c_int = 1;
const SEEK_END: c_int = 2;

type Reader = Cursor<Vec<u8>>;

/// An opened demuxer reading from a private copy of the caller's bytes.
///
/// Dereferences to [`Input`]. The format context is closed before the I/O
/// context it reads through.
pub(crate) struct MemoryInput {
    input: Input,
    _io: CustomIo,
}

impl MemoryInput {
    /// Open `data`, detect its container and read stream information.
    ///
    /// # Errors
    ///
    /// [`GifGenError::EmptyInput`] for an empty buffer, otherwise
    /// [`GifGenError::InputOpen`] when FFmpeg cannot allocate, recognise or
    /// read the input.
    pub(crate) fn open(data: &[u8]) -> Result<Self, GifGenError> {
        if data.is_empty() {
            return Err(GifGenError::EmptyInput);
        }
        crate::ffmpeg::initialize()?;

        let io = CustomIo::new(data.to_vec())?;

        let mut context = unsafe { ffmpeg_sys_next::avformat_alloc_context() };
        if context.is_null() {
            return Err(GifGenError::InputOpen(
                "Could not alloc format context".to_string(),
            ));
        }
        unsafe {
            (*context).pb = io.context;
            (*context).flags |= ffmpeg_sys_next::AVFMT_FLAG_CUSTOM_IO as c_int;
        }

        // Frees the context itself on failure.
        let ret = unsafe {
            ffmpeg_sys_next::avformat_open_input(
                &mut context,
                ptr::null(),
                ptr::null(),
                ptr::null_mut(),
            )
        };
        if ret < 0 {
            return Err(GifGenError::InputOpen(format!(
                "Could not open input data: {}",
                ffmpeg_next::Error::from(ret)
            )));
        }

        let input = unsafe { Input::wrap(context) };
        let ret = unsafe { ffmpeg_sys_next::avformat_find_stream_info(context, ptr::null_mut()) };
        if ret < 0 {
            return Err(GifGenError::InputOpen(format!(
                "Could not find stream information: {}",
                ffmpeg_next::Error::from(ret)
            )));
        }

        log::debug!(
            "Opened {} in-memory bytes as {}",
            data.len(),
            input.format().name()
        );
        Ok(Self { input, _io: io })
    }
}

impl Deref for MemoryInput {
    type Target = Input;

    fn deref(&self) -> &Input {
        &self.input
    }
}

impl DerefMut for MemoryInput {
    fn deref_mut(&mut self) -> &mut Input {
        &mut self.input
    }
}

/// RAII owner of a read-only `AVIOContext` and the cursor behind it.
struct CustomIo {
    context: *mut AVIOContext,
    reader: *mut Reader,
}

impl CustomIo {
    fn new(data: Vec<u8>) -> Result<Self, GifGenError> {
        let buffer = unsafe { ffmpeg_sys_next::av_malloc(IO_BUFFER_SIZE) }.cast::<u8>();
        if buffer.is_null() {
            return Err(GifGenError::InputOpen("Could not alloc indata".to_string()));
        }

        let reader = Box::into_raw(Box::new(Cursor::new(data)));
        let context = unsafe {
            ffmpeg_sys_next::avio_alloc_context(
                buffer,
                IO_BUFFER_SIZE as c_int,
                0,
                reader.cast(),
                Some(read_packet),
                None,
                Some(seek_packet),
            )
        };
        if context.is_null() {
            unsafe {
                ffmpeg_sys_next::av_free(buffer.cast());
                drop(Box::from_raw(reader));
            }
            return Err(GifGenError::InputOpen("Could not alloc io context".to_string()));
        }

        Ok(Self { context, reader })
    }
}

impl Drop for CustomIo {
    fn drop(&mut self) {
        unsafe {
            // FFmpeg may have swapped the buffer for a larger one.
            ffmpeg_sys_next::av_freep(ptr::addr_of_mut!((*self.context).buffer).cast());
            ffmpeg_sys_next::avio_context_free(&mut self.context);
            drop(Box::from_raw(self.reader));
        }
    }
}

unsafe extern "C" fn read_packet(opaque: *mut c_void, buffer: *mut u8, size: c_int) -> c_int {
    if size <= 0 {
        return 0;
    }
    let reader = unsafe { &mut *opaque.cast::<Reader>() };
    let destination = unsafe { std::slice::from_raw_parts_mut(buffer, size as usize) };
    match reader.read(destination) {
        Ok(0) => ffmpeg_sys_next::AVERROR_EOF,
        Ok(read) => read as c_int,
        Err(_) => ffmpeg_sys_next::AVERROR_EXTERNAL,
    }
}

unsafe extern "C" fn seek_packet(opaque: *mut c_void, offset: i64, whence: c_int) -> i64 {
    let reader = unsafe { &mut *opaque.cast::<Reader>() };
    let whence = whence & !(ffmpeg_sys_next::AVSEEK_FORCE as c_int);
    if whence == ffmpeg_sys_next::AVSEEK_SIZE as c_int {
        return reader.get_ref().len() as i64;
    }

    let target = match whence {
        SEEK_SET => match u64::try_from(offset) {
            Ok(offset) => SeekFrom::Start(offset),
            Err(_) => return -1,
        },
        SEEK_CUR => SeekFrom::Current(offset),
        SEEK_END => SeekFrom::End(offset),
        _ => return -1,
    };
    match reader.seek(target) {
        Ok(position) => position as i64,
        Err(_) => -1,
    }
}
