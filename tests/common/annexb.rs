//! Minimal H.264 Annex-B writer for test clips.
//!
//! Produces a Baseline stream with one IDR picture made of `I_PCM`
//! macroblocks followed by P pictures whose macroblocks are all skipped.
//! The SPS carries VUI timing so decoders report the requested frame rate,
//! and declares no reordering so pictures come out as soon as they decode.
//! The result is a few kilobytes regardless of length and decodes with any
//! conforming H.264 decoder.

/// Shape of a synthetic clip.
#[derive(Debug, Clone, Copy)]
pub struct ClipShape {
    /// Width in 16-pixel macroblocks.
    pub width_mbs: u32,
    /// Height in 16-pixel macroblocks.
    pub height_mbs: u32,
    /// Frames per second written into the VUI timing info.
    pub frames_per_second: u32,
    /// Total number of pictures, including the IDR.
    pub frames: u32,
}

impl ClipShape {
    pub fn width(&self) -> u32 {
        self.width_mbs * 16
    }

    pub fn height(&self) -> u32 {
        self.height_mbs * 16
    }
}

const LOG2_MAX_FRAME_NUM: u32 = 8;
const MB_TYPE_I_PCM: u32 = 25;
const SLICE_TYPE_P: u32 = 0;
const SLICE_TYPE_I: u32 = 2;

/// Encode `shape` as an Annex-B byte stream.
pub fn encode_clip(shape: ClipShape) -> Vec<u8> {
    let mut stream = Vec::new();
    push_nal(&mut stream, 3, 7, &sequence_parameter_set(shape));
    push_nal(&mut stream, 3, 8, &picture_parameter_set());
    push_nal(&mut stream, 3, 5, &idr_slice(shape));
    for frame_num in 1..shape.frames {
        push_nal(&mut stream, 2, 1, &skipped_p_slice(shape, frame_num));
    }
    stream
}

fn sequence_parameter_set(shape: ClipShape) -> Vec<u8> {
    let mut bits = BitWriter::default();
    bits.bits(66, 8); // profile_idc: Baseline
    bits.bits(0, 8); // constraint flags + reserved_zero_2bits
    bits.bits(30, 8); // level_idc
    bits.ue(0); // seq_parameter_set_id
    bits.ue(LOG2_MAX_FRAME_NUM - 4);
    bits.ue(2); // pic_order_cnt_type
    bits.ue(1); // max_num_ref_frames
    bits.flag(false); // gaps_in_frame_num_value_allowed_flag
    bits.ue(shape.width_mbs - 1);
    bits.ue(shape.height_mbs - 1);
    bits.flag(true); // frame_mbs_only_flag
    bits.flag(true); // direct_8x8_inference_flag
    bits.flag(false); // frame_cropping_flag
    bits.flag(true); // vui_parameters_present_flag

    bits.flag(false); // aspect_ratio_info_present_flag
    bits.flag(false); // overscan_info_present_flag
    bits.flag(false); // video_signal_type_present_flag
    bits.flag(false); // chroma_loc_info_present_flag
    bits.flag(true); // timing_info_present_flag
    bits.bits(1, 32); // num_units_in_tick
    bits.bits(shape.frames_per_second * 2, 32); // time_scale
    bits.flag(true); // fixed_frame_rate_flag
    bits.flag(false); // nal_hrd_parameters_present_flag
    bits.flag(false); // vcl_hrd_parameters_present_flag
    bits.flag(false); // pic_struct_present_flag
    bits.flag(true); // bitstream_restriction_flag
    bits.flag(true); // motion_vectors_over_pic_boundaries_flag
    bits.ue(0); // max_bytes_per_pic_denom
    bits.ue(0); // max_bits_per_mb_denom
    bits.ue(16); // log2_max_mv_length_horizontal
    bits.ue(16); // log2_max_mv_length_vertical
    bits.ue(0); // max_num_reorder_frames
    bits.ue(1); // max_dec_frame_buffering

    bits.finish()
}

fn picture_parameter_set() -> Vec<u8> {
    let mut bits = BitWriter::default();
    bits.ue(0); // pic_parameter_set_id
    bits.ue(0); // seq_parameter_set_id
    bits.flag(false); // entropy_coding_mode_flag: CAVLC
    bits.flag(false); // bottom_field_pic_order_in_frame_present_flag
    bits.ue(0); // num_slice_groups_minus1
    bits.ue(0); // num_ref_idx_l0_default_active_minus1
    bits.ue(0); // num_ref_idx_l1_default_active_minus1
    bits.flag(false); // weighted_pred_flag
    bits.bits(0, 2); // weighted_bipred_idc
    bits.se(0); // pic_init_qp_minus26
    bits.se(0); // pic_init_qs_minus26
    bits.se(0); // chroma_qp_index_offset
    bits.flag(true); // deblocking_filter_control_present_flag
    bits.flag(false); // constrained_intra_pred_flag
    bits.flag(false); // redundant_pic_cnt_present_flag
    bits.finish()
}

fn idr_slice(shape: ClipShape) -> Vec<u8> {
    let mut bits = BitWriter::default();
    bits.ue(0); // first_mb_in_slice
    bits.ue(SLICE_TYPE_I);
    bits.ue(0); // pic_parameter_set_id
    bits.bits(0, LOG2_MAX_FRAME_NUM); // frame_num
    bits.ue(0); // idr_pic_id
    bits.flag(false); // no_output_of_prior_pics_flag
    bits.flag(false); // long_term_reference_flag
    bits.se(0); // slice_qp_delta
    bits.ue(1); // disable_deblocking_filter_idc

    for mb_y in 0..shape.height_mbs {
        for mb_x in 0..shape.width_mbs {
            bits.ue(MB_TYPE_I_PCM);
            bits.align_with_zeros();
            for y in 0..16 {
                for x in 0..16 {
                    bits.bits(luma_sample(mb_x * 16 + x, mb_y * 16 + y), 8);
                }
            }
            for _ in 0..64 {
                bits.bits(96, 8); // Cb
            }
            for _ in 0..64 {
                bits.bits(160, 8); // Cr
            }
        }
    }

    bits.finish()
}

fn skipped_p_slice(shape: ClipShape, frame_num: u32) -> Vec<u8> {
    let mut bits = BitWriter::default();
    bits.ue(0); // first_mb_in_slice
    bits.ue(SLICE_TYPE_P);
    bits.ue(0); // pic_parameter_set_id
    bits.bits(frame_num % (1 << LOG2_MAX_FRAME_NUM), LOG2_MAX_FRAME_NUM);
    bits.flag(false); // num_ref_idx_active_override_flag
    bits.flag(false); // ref_pic_list_modification_flag_l0
    bits.flag(false); // adaptive_ref_pic_marking_mode_flag
    bits.se(0); // slice_qp_delta
    bits.ue(1); // disable_deblocking_filter_idc
    bits.ue(shape.width_mbs * shape.height_mbs); // mb_skip_run
    bits.finish()
}

/// Diagonal gradient, never zero.
fn luma_sample(x: u32, y: u32) -> u32 {
    16 + (x * 3 + y * 2) % 200
}

/// Append a start code, the NAL header and `rbsp` with emulation prevention.
fn push_nal(stream: &mut Vec<u8>, ref_idc: u8, nal_unit_type: u8, rbsp: &[u8]) {
    stream.extend_from_slice(&[0, 0, 0, 1]);
    stream.push((ref_idc << 5) | nal_unit_type);

    let mut zeros = 0;
    for &byte in rbsp {
        if zeros >= 2 && byte <= 3 {
            stream.push(3);
            zeros = 0;
        }
        stream.push(byte);
        zeros = if byte == 0 { zeros + 1 } else { 0 };
    }
}

#[derive(Default)]
struct BitWriter {
    bytes: Vec<u8>,
    current: u8,
    used: u32,
}

impl BitWriter {
    fn flag(&mut self, value: bool) {
        self.current = (self.current << 1) | u8::from(value);
        self.used += 1;
        if self.used == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.used = 0;
        }
    }

    fn bits(&mut self, value: u32, count: u32) {
        for shift in (0..count).rev() {
            self.flag((value >> shift) & 1 == 1);
        }
    }

    /// Unsigned Exp-Golomb.
    fn ue(&mut self, value: u32) {
        let coded = value + 1;
        let length = 32 - coded.leading_zeros();
        self.bits(0, length - 1);
        self.bits(coded, length);
    }

    /// Signed Exp-Golomb.
    fn se(&mut self, value: i32) {
        let mapped = if value > 0 {
            (value as u32) * 2 - 1
        } else {
            value.unsigned_abs() * 2
        };
        self.ue(mapped);
    }

    fn align_with_zeros(&mut self) {
        while self.used != 0 {
            self.flag(false);
        }
    }

    /// Append `rbsp_trailing_bits` and return the payload.
    fn finish(mut self) -> Vec<u8> {
        self.flag(true);
        self.align_with_zeros();
        self.bytes
    }
}
