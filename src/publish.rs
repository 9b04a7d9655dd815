//! Publish selection and upload hand-off.
//!
//! [`select_next`] is a pure query: scan the candidate directory, drop
//! everything already in the ledger, take the first remaining file in
//! lexicographic filename order. Ordering is a property of the sort, not of
//! file creation time.
//!
//! [`publish_next`] wires the query to an injected [`UploadClient`]: select,
//! build the post caption, upload, and only after the success signal append
//! the candidate's full path to the ledger. An upload failure is an outcome
//! value ("try again next cycle"), never a propagated error; a ledger
//! failure on either side *does* propagate, because losing the record of a
//! published file means posting it twice.
//!
//! Ledger entries are matched against candidate paths by exact string
//! comparison. Both sides build the string with `Path::join` on the
//! candidate directory followed by `display()`, so the formats stay
//! byte-identical. No normalization happens on purpose.

use crate::ledger::{LedgerError, PostLedger};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension of publishable output files. Exact match, lowercase: the
/// pipeline always writes `.jpg`.
const OUTPUT_EXTENSION: &str = "jpg";

/// Blank-line padding between the caption body and the hashtag block, so
/// the tags collapse below the fold on the platform.
const HASHTAG_SEPARATOR: &str = "\n\n\n\n\n";

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("failed to scan candidate directory: {0}")]
    Scan(#[from] io::Error),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("upload rejected: {0}")]
    Rejected(String),
    #[error("upload transport error: {0}")]
    Transport(String),
}

/// Opaque post identifier returned by the platform on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostId(pub String);

/// Session handle for the social platform.
///
/// Constructed and owned by the orchestration layer and passed into every
/// operation that needs it; the core never holds a client as ambient state.
pub trait UploadClient {
    /// Upload an encoded photo with its caption.
    fn upload_photo(&mut self, path: &Path, caption: &str) -> Result<PostId, UploadError>;

    /// URL of the account's most recent post, if any.
    fn latest_post_url(&mut self) -> Result<Option<String>, UploadError>;
}

/// Result of one publish attempt.
#[derive(Debug)]
pub enum PublishOutcome {
    Posted { path: PathBuf, post_id: PostId },
    UploadFailed { path: PathBuf, reason: String },
    /// No unposted candidate this cycle. Not an error.
    NothingToPost,
}

/// Read-only view of the publish queue.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Unposted candidate paths, in publish order.
    pub pending: Vec<String>,
    /// Number of ledger records (not deduplicated).
    pub posted: usize,
    /// The candidate the next publish cycle would pick.
    pub next: Option<String>,
}

/// First candidate in `candidate_dir` not yet recorded in `posted`.
///
/// Candidates are `.jpg` files sorted lexicographically by filename. A
/// missing candidate directory reads as "no candidates". Performs no upload
/// and no ledger mutation; calling it twice without an intervening append
/// returns the same path.
pub fn select_next(candidate_dir: &Path, posted: &[String]) -> io::Result<Option<PathBuf>> {
    Ok(candidates(candidate_dir)?
        .into_iter()
        .find(|path| !posted.iter().any(|entry| entry == &path.display().to_string())))
}

/// All `.jpg` candidates in lexicographic filename order.
fn candidates(candidate_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(candidate_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let is_output = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == OUTPUT_EXTENSION);
        if path.is_file() && is_output
            && let Some(name) = path.file_name().and_then(|n| n.to_str())
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names.into_iter().map(|n| candidate_dir.join(n)).collect())
}

/// Post caption for a candidate: the filename stem with underscores read as
/// spaces, plus the configured hashtag block below the fold.
pub fn post_caption(path: &Path, hashtags: &[String]) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .replace('_', " ");
    if hashtags.is_empty() {
        stem
    } else {
        format!("{stem}{HASHTAG_SEPARATOR}{}", hashtags.join(" "))
    }
}

/// Select the next unposted candidate and hand it to the upload client.
///
/// On the success signal the candidate's full path is appended to the
/// ledger before returning. Upload failures surface as
/// [`PublishOutcome::UploadFailed`].
pub fn publish_next(
    client: &mut dyn UploadClient,
    candidate_dir: &Path,
    ledger: &PostLedger,
    hashtags: &[String],
) -> Result<PublishOutcome, PublishError> {
    let posted = ledger.load()?;
    let Some(path) = select_next(candidate_dir, &posted)? else {
        return Ok(PublishOutcome::NothingToPost);
    };
    let caption = post_caption(&path, hashtags);
    upload_and_record(client, ledger, path, &caption)
}

/// Publish one explicitly named candidate (the RPC facade path), with an
/// optional caption override replacing the stem-derived caption.
///
/// No ledger pre-check: naming the file is an explicit request, including a
/// re-post. The success record is still appended.
pub fn publish_file(
    client: &mut dyn UploadClient,
    path: &Path,
    caption_override: Option<&str>,
    ledger: &PostLedger,
    hashtags: &[String],
) -> Result<PublishOutcome, PublishError> {
    let caption = match caption_override {
        Some(text) => text.to_string(),
        None => post_caption(path, hashtags),
    };
    upload_and_record(client, ledger, path.to_path_buf(), &caption)
}

fn upload_and_record(
    client: &mut dyn UploadClient,
    ledger: &PostLedger,
    path: PathBuf,
    caption: &str,
) -> Result<PublishOutcome, PublishError> {
    match client.upload_photo(&path, caption) {
        Ok(post_id) => {
            ledger.append(&path.display().to_string())?;
            Ok(PublishOutcome::Posted { path, post_id })
        }
        Err(e) => Ok(PublishOutcome::UploadFailed {
            path,
            reason: e.to_string(),
        }),
    }
}

/// Pending/posted snapshot of the candidate directory against the ledger.
pub fn queue_status(candidate_dir: &Path, ledger: &PostLedger) -> Result<StatusReport, PublishError> {
    let posted = ledger.load()?;
    let pending: Vec<String> = candidates(candidate_dir)?
        .into_iter()
        .map(|p| p.display().to_string())
        .filter(|p| !posted.iter().any(|entry| entry == p))
        .collect();
    let next = pending.first().cloned();
    Ok(StatusReport {
        pending,
        posted: posted.len(),
        next,
    })
}
