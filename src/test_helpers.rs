//! Shared test utilities for the picflow test suite.
//!
//! Provides synthetic image writers and a pipeline config rooted in a temp
//! directory, so tests exercise the real encode/decode path without any
//! fixture files.

use crate::config::PipelineConfig;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use std::path::Path;
use tempfile::TempDir;

/// Pipeline config with input/output/ledger rooted in `tmp`. The input
/// directory is created; the watermark font path points nowhere, so the
/// builtin face is used.
pub fn test_config(tmp: &TempDir) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.input_dir = tmp.path().join("input");
    config.output_dir = tmp.path().join("pics");
    config.ledger_file = tmp.path().join("pics.txt");
    config.watermark.font_path = tmp.path().join("no-such-font.ttf");
    std::fs::create_dir_all(&config.input_dir).unwrap();
    config
}

/// Gradient fill so resized output is visually non-trivial.
fn test_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Write a small valid JPEG with the given dimensions.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = test_image(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a small valid PNG with the given dimensions.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    let img = test_image(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    PngEncoder::new(writer)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
}
