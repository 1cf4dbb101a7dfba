//! Intake for text blocks fetched by an external crawler.
//!
//! A crawler hands over `(host, page text)` pairs. Each block goes through
//! the same extract and judge chain as the file pipeline, and accepted
//! addresses are grouped by the host they were first found on. Nothing here
//! reads the input file or touches the checkpoint.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::Config;
use crate::dedupe::DedupeIndex;
use crate::domain::{DomainCache, DomainValidator, NsLookup};
use crate::error::{IoResultExt, Result};
use crate::extract::Extractor;
use crate::sifter::{Decision, Sifter};

pub struct HostHarvest<L> {
    extractor: Extractor,
    sifter: Sifter<L>,
    hosts: BTreeMap<String, Vec<String>>,
}

impl<L: NsLookup> HostHarvest<L> {
    pub const fn new(extractor: Extractor, sifter: Sifter<L>) -> Self {
        Self {
            extractor,
            sifter,
            hosts: BTreeMap::new(),
        }
    }

    /// Use the configured pattern and domains log; dedupe starts empty.
    pub fn open(config: &Config, lookup: L) -> Result<Self> {
        let extractor =
            Extractor::new(&config.pattern)?.with_obfuscated(config.decode_obfuscated);
        let cache = DomainCache::load(&config.domains)?;
        let sifter = Sifter::new(DedupeIndex::new(), DomainValidator::new(cache, lookup));
        Ok(Self::new(extractor, sifter))
    }

    /// Scan one block from `host`. Returns the addresses newly accepted from it.
    pub fn ingest(&mut self, host: &str, text: impl AsRef<[u8]>) -> Result<Vec<String>> {
        let mut fresh = Vec::new();
        for candidate in self.extractor.extract(text.as_ref()) {
            if self.sifter.judge(&candidate)? == Decision::Accepted {
                self.sifter.accept(candidate.as_str());
                fresh.push(candidate);
            }
        }

        if !fresh.is_empty() {
            debug!(host, accepted = fresh.len(), "Harvested block");
            self.hosts
                .entry(host.to_string())
                .or_default()
                .extend(fresh.iter().cloned());
        }
        Ok(fresh)
    }

    /// Accepted addresses per host, in first-seen order
    #[must_use]
    pub const fn hosts(&self) -> &BTreeMap<String, Vec<String>> {
        &self.hosts
    }

    /// Write `{"host": ["a@x.com", ...]}` as indented JSON
    pub fn write_report(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.hosts)?;
        fs::write(path, json).with_path(path, "write host report")
    }
}
