//! Append-only ledger of published files.
//!
//! One path per line, UTF-8, append-only: records are never removed or
//! rewritten. The ledger itself does not enforce uniqueness; duplicate
//! appends are possible, and the contract that prevents duplicate posts
//! lives in the publish selector's pre-check.
//!
//! # Keying
//!
//! Entries are the full candidate path exactly as the publisher formats it.
//! Renaming the output directory or changing path formatting silently
//! defeats deduplication; both sides of the contract
//! ([`publish::select_next`](crate::publish::select_next) and
//! [`PostLedger::append`]) build paths the same way to keep the strings
//! byte-identical.
//!
//! # Failure handling
//!
//! A missing ledger file is the expected first-run state and loads as an
//! empty sequence. A ledger that exists but cannot be read is a different
//! situation entirely: treating it as "no history" would re-post everything,
//! so it surfaces as [`LedgerError::Unreadable`]. Append failures also
//! propagate: silently losing the record of a successful publish causes a
//! duplicate future post and needs operator attention.
//!
//! Single writer by contract. No locking; concurrent multi-process appends
//! are out of contract and may interleave lines.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger {path} exists but is unreadable: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to append to ledger {path}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Handle on the posted-files ledger.
#[derive(Debug, Clone)]
pub struct PostLedger {
    path: PathBuf,
}

impl PostLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all recorded identifiers in append order.
    ///
    /// A missing file yields an empty sequence; any other read failure is an
    /// error.
    pub fn load(&self) -> Result<Vec<String>, LedgerError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(LedgerError::Unreadable {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Append one identifier as a line, durable before returning.
    ///
    /// The line is written in a single call and flushed so a later reader
    /// never observes a partial record.
    pub fn append(&self, identifier: &str) -> Result<(), LedgerError> {
        let append_err = |source| LedgerError::Append {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(append_err)?;
        file.write_all(format!("{identifier}\n").as_bytes())
            .map_err(append_err)?;
        file.flush().map_err(append_err)?;
        Ok(())
    }
}
