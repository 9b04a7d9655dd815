//! CLI output formatting for the one-shot commands.
//!
//! Each report has a `format_*` function returning `Vec<String>` (pure, no
//! I/O, unit-testable) and a `print_*` wrapper that writes to stdout.
//!
//! ```text
//! Processed 2 images (1 failed)
//!     dawn.jpg -> pics/Golden_hour.jpg
//!     blur.jpg failed: failed to decode
//! ```

use crate::pipeline::{BatchReport, ItemOutcome};
use crate::publish::{PublishOutcome, StatusReport};
use std::path::Path;

/// Filename portion of a path, for compact display.
fn short(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Batch summary plus one line per item.
pub fn format_batch_report(report: &BatchReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.items.len() + 1);
    let mut header = format!("Processed {} images", report.processed());
    if report.failed() > 0 {
        header.push_str(&format!(" ({} failed)", report.failed()));
    }
    if report.skipped() > 0 {
        header.push_str(&format!(" ({} skipped)", report.skipped()));
    }
    lines.push(header);

    for item in &report.items {
        lines.push(match item {
            ItemOutcome::Processed { input, output } => {
                format!("    {} -> {}", short(input), output.display())
            }
            ItemOutcome::Skipped { input, reason } => {
                format!("    {} skipped: {}", short(input), reason)
            }
            ItemOutcome::Failed { input, reason } => {
                format!("    {} failed: {}", short(input), reason)
            }
        });
    }
    lines
}

/// One publish attempt, one or two lines.
pub fn format_publish_outcome(outcome: &PublishOutcome) -> Vec<String> {
    match outcome {
        PublishOutcome::Posted { path, post_id } => vec![format!(
            "Posted {} (post id {})",
            path.display(),
            post_id.0
        )],
        PublishOutcome::UploadFailed { path, reason } => vec![
            format!("Upload failed for {}", path.display()),
            format!("    {}", reason),
        ],
        PublishOutcome::NothingToPost => vec!["Nothing to post".to_string()],
    }
}

/// Publish queue status: counts plus the pending list.
pub fn format_status(status: &StatusReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} pending, {} posted",
        status.pending.len(),
        status.posted
    )];
    for (i, path) in status.pending.iter().enumerate() {
        let marker = if i == 0 { " (next)" } else { "" };
        lines.push(format!("    {}{}", path, marker));
    }
    lines
}

pub fn print_batch_report(report: &BatchReport) {
    for line in format_batch_report(report) {
        println!("{line}");
    }
}

pub fn print_publish_outcome(outcome: &PublishOutcome) {
    for line in format_publish_outcome(outcome) {
        println!("{line}");
    }
}

pub fn print_status(status: &StatusReport) {
    for line in format_status(status) {
        println!("{line}");
    }
}
