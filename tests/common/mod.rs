//! Shared test doubles for the native boundary and synthetic H.264 clips.

#![allow(dead_code)]

pub mod annexb;

use std::ffi::c_int;
use std::sync::Mutex;

use gifgen::{NativeConverter, STATUS_OK};

/// A converter returning canned results and recording how it was called.
pub struct StubConverter {
    status: c_int,
    output: Vec<u8>,
    reported_size: Option<c_int>,
    calls: Mutex<Vec<StubCall>>,
}

/// Arguments of one recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubCall {
    pub duration: c_int,
    pub rotation: c_int,
    pub input: Vec<u8>,
    pub capacity: usize,
}

impl StubConverter {
    /// Succeeds and writes `output`.
    pub fn succeeding(output: &[u8]) -> Self {
        Self {
            status: STATUS_OK,
            output: output.to_vec(),
            reported_size: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails with `status` without writing anything.
    pub fn failing(status: c_int) -> Self {
        Self {
            status,
            output: Vec::new(),
            reported_size: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Succeeds but reports `size` instead of the real length.
    pub fn misreporting(output: &[u8], size: c_int) -> Self {
        Self {
            reported_size: Some(size),
            ..Self::succeeding(output)
        }
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl NativeConverter for StubConverter {
    fn gen_gif(
        &self,
        duration: c_int,
        rotation: c_int,
        input: &[u8],
        output: &mut [u8],
        output_size: &mut c_int,
    ) -> c_int {
        self.calls.lock().unwrap().push(StubCall {
            duration,
            rotation,
            input: input.to_vec(),
            capacity: output.len(),
        });

        if self.status != STATUS_OK {
            return self.status;
        }

        let length = self.output.len().min(output.len());
        output[..length].copy_from_slice(&self.output[..length]);
        *output_size = self.reported_size.unwrap_or(length as c_int);
        STATUS_OK
    }
}

/// A few bytes shaped like a GIF header, enough for the binding layer.
pub const FAKE_GIF: &[u8] = b"GIF89a\x02\x00\x02\x00\x00\x00\x00;";

/// The clip most tests convert: 64x48, 25 fps, six seconds.
pub const SAMPLE_SHAPE: annexb::ClipShape = annexb::ClipShape {
    width_mbs: 4,
    height_mbs: 3,
    frames_per_second: 25,
    frames: 150,
};

/// Annex-B bytes for [`SAMPLE_SHAPE`].
pub fn sample_clip() -> Vec<u8> {
    annexb::encode_clip(SAMPLE_SHAPE)
}
