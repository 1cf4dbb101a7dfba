//! Resumable scan of the input file.
//!
//! One run walks `Init → Seeding → Scanning → Draining → Done`. Any error
//! that escapes a stage moves the pipeline to `Fatal` and ends the run.
//!
//! Work is committed one line at a time: the accepted records of a line are
//! appended to the output log, then the checkpoint is replaced with the
//! offset just past that line. A crash can therefore only cause the last
//! line to be scanned again, which dedupe turns into a no-op. A last line
//! without a newline is not scanned unless `scan_unterminated` is set, so the
//! checkpoint stays on a line boundary while the input is still growing.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};

use tracing::{debug, error, info, warn};

use crate::checkpoint::Checkpoint;
use crate::config::{CheckpointPolicy, Config};
use crate::dedupe::DedupeIndex;
use crate::domain::{DomainCache, DomainValidator, NsLookup};
use crate::error::{IoResultExt, Result, SiftError};
use crate::extract::Extractor;
use crate::output::{EmailRecord, OutputLog};
use crate::sifter::{Decision, Sifter};

/// Lifecycle of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Seeding,
    Scanning,
    Draining,
    Done,
    Fatal,
}

/// Counters reported at the end of a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Checkpoint the run resumed from
    pub start_offset: u64,
    /// Checkpoint persisted last
    pub end_offset: u64,
    pub lines: usize,
    pub candidates: usize,
    pub duplicates: usize,
    pub syntax_rejected: usize,
    pub domain_rejected: usize,
    pub accepted: usize,
    /// Nameserver lookups issued (cache misses)
    pub lookups: usize,
    /// Records or domains dropped because they could not be written
    pub write_failures: usize,
}

/// Extraction pipeline over one input file
pub struct Pipeline<L> {
    config: Config,
    lookup: L,
    phase: Phase,
}

impl<L: NsLookup> Pipeline<L> {
    pub const fn new(config: Config, lookup: L) -> Self {
        Self {
            config,
            lookup,
            phase: Phase::Init,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Process everything past the checkpoint (or up to `max_lines` lines).
    pub fn run(&mut self) -> Result<RunStats> {
        let result = run_stages(&self.config, &self.lookup, &mut self.phase);
        if let Err(e) = &result {
            error!(phase = ?self.phase, error = %e, "Pipeline aborted");
            self.phase = Phase::Fatal;
        }
        result
    }
}

fn enter(phase: &mut Phase, next: Phase) {
    debug!(from = ?phase, to = ?next, "Pipeline phase change");
    *phase = next;
}

fn run_stages<L: NsLookup>(config: &Config, lookup: &L, phase: &mut Phase) -> Result<RunStats> {
    enter(phase, Phase::Seeding);
    let extractor = Extractor::new(&config.pattern)?.with_obfuscated(config.decode_obfuscated);
    let seen = DedupeIndex::seed_from(&config.output)?;
    let cache = DomainCache::load(&config.domains)?;
    let mut checkpoint = Checkpoint::load(&config.checkpoint)?;
    let output = OutputLog::open(&config.output)?;

    enter(phase, Phase::Scanning);
    let mut file = File::open(&config.input).with_path(&config.input, "open input")?;
    let size = file
        .metadata()
        .with_path(&config.input, "stat input")?
        .len();
    if checkpoint.offset() > size {
        warn!(
            checkpoint = checkpoint.offset(),
            size, "Checkpoint is past the end of the input, rescanning from the start"
        );
        checkpoint.reset();
    }
    file.seek(SeekFrom::Start(checkpoint.offset()))
        .with_path(&config.input, "seek input")?;

    let mut scan = Scan {
        config,
        extractor,
        sifter: Sifter::new(seen, DomainValidator::new(cache, lookup)),
        output,
        checkpoint,
        stats: RunStats::default(),
    };
    scan.stats.start_offset = scan.checkpoint.offset();
    info!(
        input = %config.input.display(),
        offset = scan.stats.start_offset,
        "Scanning input"
    );
    scan.lines(BufReader::new(file))?;

    enter(phase, Phase::Draining);
    scan.output.sync()?;
    scan.stats.end_offset = scan.checkpoint.offset();
    scan.stats.lookups = scan.sifter.domains().lookups();

    enter(phase, Phase::Done);
    Ok(scan.stats)
}

/// State owned while scanning
struct Scan<'a, L> {
    config: &'a Config,
    extractor: Extractor,
    sifter: Sifter<&'a L>,
    output: OutputLog,
    checkpoint: Checkpoint,
    stats: RunStats,
}

impl<L: NsLookup> Scan<'_, L> {
    fn lines(&mut self, mut reader: impl BufRead) -> Result<()> {
        let mut line = Vec::new();
        loop {
            if self
                .config
                .max_lines
                .is_some_and(|max| self.stats.lines >= max)
            {
                info!(lines = self.stats.lines, "Line limit reached");
                return Ok(());
            }

            line.clear();
            let consumed = reader
                .read_until(b'\n', &mut line)
                .with_path(&self.config.input, "read input")?;
            if consumed == 0 {
                return Ok(());
            }
            if line.last() != Some(&b'\n') && !self.config.scan_unterminated {
                // The producer may still be writing this line; take it whole next run.
                info!(bytes = consumed, "Leaving unterminated last line for the next run");
                return Ok(());
            }

            self.line(&line)?;
            self.checkpoint.advance(consumed as u64);
            self.checkpoint.persist()?;
            self.stats.lines += 1;
        }
    }

    fn line(&mut self, line: &[u8]) -> Result<()> {
        for candidate in self.extractor.extract(line) {
            self.stats.candidates += 1;
            match self.sifter.judge(&candidate) {
                Ok(Decision::Accepted) => {
                    match self.output.append(&EmailRecord::new(candidate.as_str())) {
                        Ok(()) => {
                            info!(email = %candidate, "Accepted");
                            self.sifter.accept(candidate);
                            self.stats.accepted += 1;
                        }
                        Err(e) => self.write_failed(e)?,
                    }
                }
                Ok(Decision::Duplicate) => self.stats.duplicates += 1,
                Ok(Decision::BadSyntax) => self.stats.syntax_rejected += 1,
                Ok(Decision::BadDomain(_)) => self.stats.domain_rejected += 1,
                Err(e) => self.write_failed(e)?,
            }
        }
        Ok(())
    }

    fn write_failed(&mut self, e: SiftError) -> Result<()> {
        match self.config.checkpoint_policy {
            CheckpointPolicy::Strict => Err(e),
            CheckpointPolicy::Lenient => {
                warn!(error = %e, "Write failed, dropping candidate");
                self.stats.write_failures += 1;
                Ok(())
            }
        }
    }
}
