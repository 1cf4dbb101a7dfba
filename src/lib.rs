// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::significant_drop_tightening)]

//! Resumable Email Sifter
//!
//! Extracts email addresses from a growing text or log file, validates them,
//! and appends the new ones to an output log. Progress is checkpointed by
//! byte offset after every line so an interrupted run picks up where it
//! stopped.
//!
//! # Features
//!
//! - Coarse pattern extraction over raw bytes
//! - Strict syntax check, then a nameserver check per domain
//! - Persistent domain cache so known-good domains are never looked up again
//! - Dedupe seeded from the output log
//! - Per-line byte-offset checkpoint
//!
//! # Example
//!
//! ```rust
//! use email_sift::{Extractor, is_valid_syntax};
//!
//! let candidates = Extractor::default().extract(b"mail john@example.com today");
//! assert_eq!(candidates, vec!["john@example.com"]);
//! assert!(is_valid_syntax(&candidates[0]));
//! ```

mod checkpoint;
mod config;
mod dedupe;
mod domain;
mod error;
mod extract;
mod harvest;
mod output;
mod pipeline;
mod sifter;
mod syntax;

pub use checkpoint::Checkpoint;
pub use config::{
    CheckpointPolicy, Config, DEFAULT_CHECKPOINT, DEFAULT_DOMAINS, DEFAULT_INPUT, DEFAULT_OUTPUT,
    DnsConfig,
};
pub use dedupe::DedupeIndex;
pub use domain::{
    DnsLookup, DomainCache, DomainValidator, DomainVerdict, LookupOutcome, NsLookup,
    ResolverSource,
};
pub use error::{IoResultExt, Result, SiftError};
pub use extract::{DEFAULT_PATTERN, Extractor};
pub use harvest::HostHarvest;
pub use output::{EmailRecord, OutputLog};
pub use pipeline::{Phase, Pipeline, RunStats};
pub use sifter::{Decision, Sifter};
pub use syntax::is_valid_syntax;
