//! Benchmarks for the binding layer, the FFmpeg converter and thumbnails.
//!
//! Run with: cargo bench
//!
//! The converter benchmark runs on the synthetic clip the tests use, or on
//! `tests/fixtures/sample_video.h264` when it has been generated.

#[allow(dead_code)]
#[path = "../tests/common/annexb.rs"]
mod annexb;

use std::ffi::c_int;
use std::path::Path;

use criterion::{Criterion, criterion_group, criterion_main};
use gifgen::{
    ConversionOptions, FfmpegLogLevel, GifGenerator, NativeConverter, STATUS_OK, ThumbnailFormat,
};

const SAMPLE_STREAM: &str = "tests/fixtures/sample_video.h264";

/// Writes a fixed payload, isolating the cost of the binding layer.
struct FixedOutput(Vec<u8>);

impl NativeConverter for FixedOutput {
    fn gen_gif(
        &self,
        _duration: c_int,
        _rotation: c_int,
        _input: &[u8],
        output: &mut [u8],
        output_size: &mut c_int,
    ) -> c_int {
        output[..self.0.len()].copy_from_slice(&self.0);
        *output_size = self.0.len() as c_int;
        STATUS_OK
    }
}

fn benchmark_binding_overhead(criterion: &mut Criterion) {
    let payload = vec![0x47; 200 * 1024];
    let input = vec![0u8; 64 * 1024];

    let generator = GifGenerator::new(FixedOutput(payload.clone()));
    criterion.bench_function("binding round trip (1 MiB working buffer)", |bencher| {
        bencher.iter(|| generator.convert(5, 90, &input).unwrap());
    });

    let generator = GifGenerator::new(FixedOutput(payload))
        .options(ConversionOptions::new().with_output_capacity(256 * 1024));
    criterion.bench_function("binding round trip (256 KiB working buffer)", |bencher| {
        bencher.iter(|| generator.convert(5, 90, &input).unwrap());
    });
}

fn benchmark_ffmpeg_conversion(criterion: &mut Criterion) {
    gifgen::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    let video = if Path::new(SAMPLE_STREAM).exists() {
        std::fs::read(SAMPLE_STREAM).unwrap()
    } else {
        annexb::encode_clip(annexb::ClipShape {
            width_mbs: 40,
            height_mbs: 23,
            frames_per_second: 25,
            frames: 150,
        })
    };

    let mut group = criterion.benchmark_group("ffmpeg conversion");
    group.sample_size(10);
    group.bench_function("5 seconds, rotated 90", |bencher| {
        bencher.iter(|| gifgen::gen_gif(5, 90, &video).unwrap());
    });
    group.bench_function("1 second, upright", |bencher| {
        bencher.iter(|| gifgen::gen_gif(1, 0, &video).unwrap());
    });
    group.bench_function("first-frame PNG thumbnail", |bencher| {
        bencher.iter(|| gifgen::render_thumbnail(ThumbnailFormat::Png, 320, &video).unwrap());
    });
    group.finish();
}

criterion_group!(benches, benchmark_binding_overhead, benchmark_ffmpeg_conversion);
criterion_main!(benches);
