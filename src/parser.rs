//! Elementary-stream packetiser.
//!
//! Raw H.264 has no container to demux, so packets are cut out of the input
//! with FFmpeg's bitstream parser (`av_parser_parse2`). `ffmpeg-next` does not
//! wrap the parser API, so this module owns the raw context.

use std::ffi::c_int;
use std::ptr;

use ffmpeg_next::Packet;
use ffmpeg_next::codec::Id;
use ffmpeg_next::decoder::Video as VideoDecoder;
use ffmpeg_sys_next::{AVCodecID, AVCodecParserContext};

use crate::error::GifGenError;

/// Largest slice handed to the parser in one call.
const PARSE_CHUNK_SIZE: usize = 4096;

/// RAII owner of an `AVCodecParserContext`.
pub(crate) struct ElementaryStreamParser {
    context: *mut AVCodecParserContext,
}

impl ElementaryStreamParser {
    pub(crate) fn new(codec_id: Id) -> Result<Self, GifGenError> {
        let raw_id: AVCodecID = codec_id.into();
        let context = unsafe { ffmpeg_sys_next::av_parser_init(raw_id as c_int) };
        if context.is_null() {
            return Err(GifGenError::VideoDecodeError(format!(
                "No bitstream parser for {codec_id:?}"
            )));
        }
        Ok(Self { context })
    }

    /// Feed the front of `data` to the parser.
    ///
    /// Returns how many bytes were consumed and the packet completed by them,
    /// if any. `data` must be followed by `AV_INPUT_BUFFER_PADDING_SIZE`
    /// readable bytes.
    pub(crate) fn parse(
        &mut self,
        decoder: &mut VideoDecoder,
        data: &[u8],
    ) -> Result<(usize, Option<Packet>), GifGenError> {
        let chunk = &data[..data.len().min(PARSE_CHUNK_SIZE)];
        self.parse_raw(decoder, chunk.as_ptr(), chunk.len() as c_int)
    }

    /// Drain the packet still buffered inside the parser.
    pub(crate) fn flush(
        &mut self,
        decoder: &mut VideoDecoder,
    ) -> Result<Option<Packet>, GifGenError> {
        let (_, packet) = self.parse_raw(decoder, ptr::null(), 0)?;
        Ok(packet)
    }

    fn parse_raw(
        &mut self,
        decoder: &mut VideoDecoder,
        data: *const u8,
        size: c_int,
    ) -> Result<(usize, Option<Packet>), GifGenError> {
        let mut packet_data: *mut u8 = ptr::null_mut();
        let mut packet_size: c_int = 0;

        let consumed = unsafe {
            ffmpeg_sys_next::av_parser_parse2(
                self.context,
                decoder.as_mut_ptr(),
                &mut packet_data,
                &mut packet_size,
                data,
                size,
                ffmpeg_sys_next::AV_NOPTS_VALUE,
                ffmpeg_sys_next::AV_NOPTS_VALUE,
                0,
            )
        };
        if consumed < 0 {
            return Err(GifGenError::VideoDecodeError(format!(
                "Error while parsing, ret={consumed}"
            )));
        }

        let packet = if packet_size > 0 && !packet_data.is_null() {
            // The parser's output points into its own buffer, which the next
            // call may overwrite.
            let bytes = unsafe { std::slice::from_raw_parts(packet_data, packet_size as usize) };
            Some(Packet::copy(bytes))
        } else {
            None
        };

        Ok((consumed as usize, packet))
    }
}

impl Drop for ElementaryStreamParser {
    fn drop(&mut self) {
        unsafe { ffmpeg_sys_next::av_parser_close(self.context) };
    }
}

/// Copy `input` into a buffer followed by the zeroed padding FFmpeg's
/// parsers may read past the end.
pub(crate) fn padded_copy(input: &[u8]) -> Vec<u8> {
    let padding = ffmpeg_sys_next::AV_INPUT_BUFFER_PADDING_SIZE as usize;
    let mut buffer = Vec::with_capacity(input.len() + padding);
    buffer.extend_from_slice(input);
    buffer.resize(input.len() + padding, 0);
    buffer
}
