//! Batch image processing: raw photo in, publish-ready candidate out.
//!
//! Each input runs through stamp → classify → normalize → caption →
//! sanitize, is encoded as JPEG into the output directory under its
//! caption-derived name, and only then has its original deleted.
//!
//! Failures are per-item values, not exceptions: every file yields an
//! [`ItemOutcome`] and the batch always runs to completion. The caller
//! decides what to do with the report. Two different photos whose captions
//! sanitize to the same name silently overwrite each other, an accepted
//! lossy-naming risk.

use crate::caption::{CaptionRequest, CaptionSource, strip_hashtags, to_filename};
use crate::config::PipelineConfig;
use crate::imaging::{Stamper, normalize};
use image::{DynamicImage, ImageReader};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Input extensions the pipeline picks up, lowercase.
const INPUT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// What happened to one input file.
#[derive(Debug)]
pub enum ItemOutcome {
    /// Transformed, written, original removed.
    Processed { input: PathBuf, output: PathBuf },
    /// Input disappeared between listing and open; not a failure.
    Skipped { input: PathBuf, reason: String },
    /// Abandoned; the original stays for the next cycle.
    Failed { input: PathBuf, reason: String },
}

impl ItemOutcome {
    pub fn input(&self) -> &Path {
        match self {
            Self::Processed { input, .. }
            | Self::Skipped { input, .. }
            | Self::Failed { input, .. } => input,
        }
    }
}

/// Collected outcomes of one batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, ItemOutcome::Processed { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, ItemOutcome::Failed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, ItemOutcome::Skipped { .. }))
            .count()
    }
}

/// Per-request overrides for a single processing call (the RPC facade).
#[derive(Debug, Default, Clone)]
pub struct ProcessOverrides {
    pub watermark_text: Option<String>,
    pub watermark_opacity: Option<u8>,
    /// Bypass the caption source entirely.
    pub custom_caption: Option<String>,
}

/// Process every image in the input directory, in sorted filename order.
///
/// Only the directory listing itself can fail; everything per-file lands in
/// the report.
pub fn process_batch(
    config: &PipelineConfig,
    captioner: &dyn CaptionSource,
) -> Result<BatchReport, ProcessError> {
    std::fs::create_dir_all(&config.output_dir)?;
    let stamper = Stamper::new(&config.watermark.font_path, config.watermark.font_size);
    let overrides = ProcessOverrides::default();

    let mut report = BatchReport::default();
    for input in list_inputs(&config.input_dir)? {
        let outcome = process_one(config, &stamper, captioner, &input, &overrides);
        match &outcome {
            ItemOutcome::Processed { output, .. } => {
                tracing::info!(input = %input.display(), output = %output.display(), "processed")
            }
            ItemOutcome::Skipped { reason, .. } => {
                tracing::debug!(input = %input.display(), reason = %reason, "skipped")
            }
            ItemOutcome::Failed { reason, .. } => {
                tracing::warn!(input = %input.display(), reason = %reason, "failed")
            }
        }
        report.items.push(outcome);
    }
    Ok(report)
}

/// Process one named file from the input directory.
pub fn process_file(
    config: &PipelineConfig,
    captioner: &dyn CaptionSource,
    filename: &str,
    overrides: &ProcessOverrides,
) -> Result<ItemOutcome, ProcessError> {
    std::fs::create_dir_all(&config.output_dir)?;
    let stamper = Stamper::new(&config.watermark.font_path, config.watermark.font_size);
    let input = config.input_dir.join(filename);
    Ok(process_one(config, &stamper, captioner, &input, overrides))
}

/// Image files in the input directory, sorted by filename.
fn list_inputs(input_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut names: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let entry = entry?;
        let path = entry.path();
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| INPUT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if path.is_file()
            && matches_ext
            && let Some(name) = path.file_name().and_then(|n| n.to_str())
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names.into_iter().map(|n| input_dir.join(n)).collect())
}

fn process_one(
    config: &PipelineConfig,
    stamper: &Stamper,
    captioner: &dyn CaptionSource,
    input: &Path,
    overrides: &ProcessOverrides,
) -> ItemOutcome {
    let image = match decode(input) {
        Ok(image) => image,
        Err(DecodeFailure::Vanished) => {
            return ItemOutcome::Skipped {
                input: input.to_path_buf(),
                reason: "input no longer exists".into(),
            };
        }
        Err(DecodeFailure::Other(reason)) => {
            return ItemOutcome::Failed {
                input: input.to_path_buf(),
                reason,
            };
        }
    };

    let text = overrides
        .watermark_text
        .as_deref()
        .unwrap_or(&config.watermark.text);
    let opacity = overrides
        .watermark_opacity
        .unwrap_or(config.watermark.opacity);
    let margin = (config.watermark.margin[0], config.watermark.margin[1]);

    let stamped = stamper.stamp(&image, text, opacity, margin);
    let canvas = normalize(&DynamicImage::ImageRgb8(stamped));

    let caption = match resolve_caption(captioner, input, overrides) {
        Ok(caption) => caption,
        Err(reason) => {
            return ItemOutcome::Failed {
                input: input.to_path_buf(),
                reason,
            };
        }
    };

    let name = to_filename(&strip_hashtags(&caption));
    if name.is_empty() {
        return ItemOutcome::Failed {
            input: input.to_path_buf(),
            reason: "caption sanitized to an empty name".into(),
        };
    }

    let output = config.output_dir.join(format!("{name}.jpg"));
    if let Err(e) = encode_jpeg(&canvas, &output, config.jpeg_quality) {
        return ItemOutcome::Failed {
            input: input.to_path_buf(),
            reason: format!("JPEG encode failed: {e}"),
        };
    }

    // The original goes only after the output is safely on disk.
    if let Err(e) = std::fs::remove_file(input) {
        return ItemOutcome::Failed {
            input: input.to_path_buf(),
            reason: format!("output written but original not removed: {e}"),
        };
    }

    ItemOutcome::Processed {
        input: input.to_path_buf(),
        output,
    }
}

enum DecodeFailure {
    Vanished,
    Other(String),
}

fn decode(input: &Path) -> Result<DynamicImage, DecodeFailure> {
    let reader = ImageReader::open(input).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            DecodeFailure::Vanished
        } else {
            DecodeFailure::Other(format!("failed to open: {e}"))
        }
    })?;
    reader
        .decode()
        .map_err(|e| DecodeFailure::Other(format!("failed to decode: {e}")))
}

fn resolve_caption(
    captioner: &dyn CaptionSource,
    input: &Path,
    overrides: &ProcessOverrides,
) -> Result<String, String> {
    if let Some(custom) = &overrides.custom_caption {
        return Ok(custom.clone());
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let caption = captioner
        .caption(&CaptionRequest::for_stem(&stem))
        .map_err(|e| e.to_string())?;
    if caption.trim().is_empty() {
        return Err("caption source returned empty text".into());
    }
    Ok(caption)
}

fn encode_jpeg(
    canvas: &image::RgbImage,
    output: &Path,
    quality: u8,
) -> Result<(), image::ImageError> {
    let file = std::fs::File::create(output)?;
    let writer = io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);
    canvas.write_with_encoder(encoder)
}
