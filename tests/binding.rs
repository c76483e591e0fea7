//! Binding layer tests against a stubbed native converter.

mod common;

use std::sync::Arc;

use common::{FAKE_GIF, StubConverter};
use gifgen::{ConversionOptions, GifGenError, GifGenerator, NativeConverter, STATUS_NO_FRAMES};

#[test]
fn success_returns_exactly_the_reported_bytes() {
    let generator = GifGenerator::new(StubConverter::succeeding(FAKE_GIF));
    let output = generator.convert(5, 90, b"video").expect("conversion should succeed");

    assert_eq!(output, FAKE_GIF);
    assert_eq!(output.len(), FAKE_GIF.len());
}

#[test]
fn parameters_reach_the_converter_unchanged() {
    let generator = GifGenerator::new(StubConverter::succeeding(FAKE_GIF))
        .options(ConversionOptions::new().with_output_capacity(4096));
    generator.convert(-1, 270, b"abc").unwrap();

    let calls = generator.converter().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].duration, -1);
    assert_eq!(calls[0].rotation, 270);
    assert_eq!(calls[0].input, b"abc");
    assert_eq!(calls[0].capacity, 4096);
}

#[test]
fn default_capacity_is_one_mebibyte() {
    let generator = GifGenerator::new(StubConverter::succeeding(FAKE_GIF));
    generator.convert(5, 90, b"video").unwrap();

    assert_eq!(generator.converter().calls()[0].capacity, 1 << 20);
}

#[test]
fn non_zero_status_becomes_conversion_error() {
    let generator = GifGenerator::new(StubConverter::failing(-1094995529));
    let result = generator.convert(5, 90, b"video");

    match result {
        Err(GifGenError::Conversion { code }) => assert_eq!(code, -1094995529),
        other => panic!("expected conversion error, got {other:?}"),
    }
}

#[test]
fn positive_status_is_also_a_failure() {
    let generator = GifGenerator::new(StubConverter::failing(7));
    let error = generator.convert(5, 90, b"video").unwrap_err();

    assert!(error.to_string().contains("ret=7"), "{error}");
}

#[test]
fn empty_input_is_rejected_before_the_native_call() {
    let generator = GifGenerator::new(StubConverter::succeeding(FAKE_GIF));
    let result = generator.convert(5, 90, &[]);

    assert!(matches!(result, Err(GifGenError::EmptyInput)));
    assert!(generator.converter().calls().is_empty());
}

#[test]
fn reported_length_beyond_capacity_is_a_contract_violation() {
    let generator = GifGenerator::new(StubConverter::misreporting(FAKE_GIF, 1 << 21))
        .options(ConversionOptions::new().with_output_capacity(1 << 20));
    let result = generator.convert(5, 90, b"video");

    match result {
        Err(GifGenError::OutputOverflow { reported, capacity }) => {
            assert_eq!(reported, 1 << 21);
            assert_eq!(capacity, 1 << 20);
        }
        other => panic!("expected overflow error, got {other:?}"),
    }
}

#[test]
fn negative_reported_length_is_a_contract_violation() {
    let generator = GifGenerator::new(StubConverter::misreporting(FAKE_GIF, -5));
    let result = generator.convert(5, 90, b"video");

    assert!(matches!(
        result,
        Err(GifGenError::OutputOverflow { reported: -5, .. })
    ));
}

#[test]
fn zero_length_success_yields_empty_output() {
    let generator = GifGenerator::new(StubConverter::succeeding(&[]));
    let output = generator.convert(5, 90, b"video").unwrap();

    assert!(output.is_empty());
}

#[test]
fn output_exactly_at_capacity_is_accepted() {
    let generator = GifGenerator::new(StubConverter::succeeding(FAKE_GIF))
        .options(ConversionOptions::new().with_output_capacity(FAKE_GIF.len()));
    let output = generator.convert(5, 90, b"video").unwrap();

    assert_eq!(output, FAKE_GIF);
}

#[test]
fn each_call_is_independent() {
    let generator = GifGenerator::new(StubConverter::succeeding(FAKE_GIF));
    let first = generator.convert(5, 90, b"one").unwrap();
    let second = generator.convert(5, 90, b"two").unwrap();

    assert_eq!(first, second);
    assert_eq!(generator.converter().calls().len(), 2);
}

#[test]
fn shared_converters_forward_the_contract() {
    let stub = Arc::new(StubConverter::failing(STATUS_NO_FRAMES));
    let boxed: Box<dyn NativeConverter> = Box::new(Arc::clone(&stub));
    let generator = GifGenerator::new(boxed);

    let result = generator.convert(5, 90, b"video");

    assert!(matches!(
        result,
        Err(GifGenError::Conversion { code: STATUS_NO_FRAMES })
    ));
    assert_eq!(stub.calls().len(), 1);
}
