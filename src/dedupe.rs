//! In-memory index of emails already present in the output log

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use tracing::{info, warn};

use crate::error::{IoResultExt, Result, SiftError};
use crate::output::EmailRecord;

/// Set of accepted emails. The output log is its only persistence.
#[derive(Debug, Default, Clone)]
pub struct DedupeIndex {
    emails: HashSet<String>,
}

impl DedupeIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the index by replaying the output log.
    ///
    /// A missing log yields an empty index. Lines that do not decode as
    /// records are skipped with a warning.
    pub fn seed_from(path: &Path) -> Result<Self> {
        let mut index = Self::new();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(index),
            Err(e) => return Err(SiftError::io(path, "open output log", e)),
        };

        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_path(path, "read output log")?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EmailRecord>(&line) {
                Ok(record) => index.record(record.email),
                Err(e) => warn!(line = n + 1, error = %e, "Skipping undecodable output record"),
            }
        }

        info!(path = %path.display(), emails = index.len(), "Seeded dedupe index");
        Ok(index)
    }

    #[must_use]
    pub fn seen(&self, email: &str) -> bool {
        self.emails.contains(email)
    }

    /// Idempotent insert
    pub fn record(&mut self, email: impl Into<String>) {
        self.emails.insert(email.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.emails.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_idempotent() {
        let mut index = DedupeIndex::new();
        index.record("a@b.co");
        index.record("a@b.co");
        assert_eq!(index.len(), 1);
        assert!(index.seen("a@b.co"));
        assert!(!index.seen("A@b.co"));
    }
}
