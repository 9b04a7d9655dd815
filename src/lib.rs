//! # picflow
//!
//! An automated photo publishing pipeline. Your filesystem is the queue:
//! raw photos dropped into an input folder are transformed into
//! platform-compliant images, wait in an output folder as publish
//! candidates, and go out on a weekly schedule, one per slot.
//!
//! # Architecture: Process, Select, Publish
//!
//! The pipeline is three independent steps around two directories and one
//! ledger file:
//!
//! ```text
//! 1. Process   input_images/  →  pics/      (watermark + canvas + caption name)
//! 2. Select    pics/ minus pics.txt         (first unposted, sorted by name)
//! 3. Publish   upload → append to pics.txt  (record only after success)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Inspectability**: the queue is a directory listing and the history is
//!   a text file; `picflow status` is a plain read of both.
//! - **Crash safety by bookkeeping**: a file is only deleted after its
//!   output is written, and only recorded after the platform confirms the
//!   post. Re-running any step is safe.
//! - **Testability**: selection and naming are pure functions over strings
//!   and directory listings; the pixel steps are pure functions over
//!   decoded buffers.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Watermark stamp, orientation classify, canvas normalize |
//! | [`caption`] | Hashtag stripping, filename sanitization, caption-source seam |
//! | [`pipeline`] | Batch processing with per-item outcome values |
//! | [`ledger`] | Append-only record of published paths |
//! | [`publish`] | Candidate selection, upload hand-off, queue status |
//! | [`notify`] | Post-publish DM fan-out with rate-limit pacing |
//! | [`schedule`] | Weekly wall-clock posting slot |
//! | [`config`] | `picflow.toml` loading, validation, stock config |
//! | [`client`] | Command-backed implementations of the collaborator traits |
//! | [`api`] | JSON-RPC-style envelope and dispatch for external callers |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Collaborators Are Injected
//!
//! The social platform client, the caption generator, and the DM client are
//! traits ([`publish::UploadClient`], [`caption::CaptionSource`],
//! [`notify::Notifier`]). The binary wires command-backed implementations
//! from config; tests wire recording mocks. Nothing in the core holds a
//! session as ambient state, so client lifecycle (create, refresh, close)
//! stays in one place at the top.
//!
//! ## Failures Are Values
//!
//! A batch never unwinds because one photo is broken: every input yields a
//! [`pipeline::ItemOutcome`] and the caller reads the report. The same
//! shape applies to publishing ([`publish::PublishOutcome`]) and DM fan-out
//! ([`notify::Delivery`]). The only hard errors are the ones that must stop
//! the show: an unreadable ledger, or a ledger append failure after a
//! confirmed post. Swallowing either would cause duplicate posts.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate (Lanczos3 resampling) and
//! `ab_glyph` for the watermark face: no external binaries, no system
//! dependencies. When the configured font is missing, a compiled-in bitmap
//! face takes over; stamping never fails the pipeline.
//!
//! ## The Ledger Is Just Lines
//!
//! One published path per line, append-only, flushed per write. It is
//! deliberately not a database: history survives anything that preserves a
//! text file, and `grep` is the query language. Paths are matched verbatim,
//! so the selector and the publisher build them identically.

pub mod api;
pub mod caption;
pub mod client;
pub mod config;
pub mod imaging;
pub mod ledger;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod publish;
pub mod schedule;

#[cfg(test)]
pub(crate) mod test_helpers;
