//! Run configuration.
//!
//! Paths and the extraction pattern come from built-in defaults, replaced by
//! command-line flags when given. DNS tuning can additionally be taken from
//! the environment:
//!
//! - `EMAIL_SIFT_DNS_TIMEOUT_SECS`
//! - `EMAIL_SIFT_DNS_ATTEMPTS`
//! - `EMAIL_SIFT_SYSTEM_RESOLVER` (`1`, `true` or `yes`)

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::ResolverSource;
use crate::error::{Result, SiftError};
use crate::extract::DEFAULT_PATTERN;

pub const DEFAULT_INPUT: &str = "input.json";
pub const DEFAULT_OUTPUT: &str = "output.json";
pub const DEFAULT_DOMAINS: &str = "domains.txt";
pub const DEFAULT_CHECKPOINT: &str = "persistent.txt";

/// What happens to the checkpoint when an accepted email or a confirmed
/// domain cannot be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckpointPolicy {
    /// Abort the run; the line is not checkpointed and is redone next time
    #[default]
    Strict,
    /// Log, drop that email, and checkpoint the line anyway
    Lenient,
}

/// Nameserver lookup settings
#[derive(Debug, Clone)]
pub struct DnsConfig {
    /// Per-query timeout; a timed out query counts as "no nameservers"
    pub timeout: Duration,
    pub attempts: usize,
    pub source: ResolverSource,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            attempts: 2,
            source: ResolverSource::Public,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Text/log file being scanned
    pub input: PathBuf,
    /// Output log of accepted emails
    pub output: PathBuf,
    /// Domains log backing the domain cache
    pub domains: PathBuf,
    /// Checkpoint file holding the processed byte offset
    pub checkpoint: PathBuf,
    /// Extraction pattern
    pub pattern: String,
    pub dns: DnsConfig,
    pub checkpoint_policy: CheckpointPolicy,
    /// Also decode `user[at]host[dot]tld` spellings
    pub decode_obfuscated: bool,
    /// Stop after this many lines; the remainder is left for the next run
    pub max_lines: Option<usize>,
    /// Also scan a last line that has no trailing newline. Only safe once the
    /// producer has finished writing the input.
    pub scan_unterminated: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            domains: PathBuf::from(DEFAULT_DOMAINS),
            checkpoint: PathBuf::from(DEFAULT_CHECKPOINT),
            pattern: DEFAULT_PATTERN.to_string(),
            dns: DnsConfig::default(),
            checkpoint_policy: CheckpointPolicy::default(),
            decode_obfuscated: false,
            max_lines: None,
            scan_unterminated: false,
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with DNS settings overridden from the environment
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("EMAIL_SIFT_DNS_TIMEOUT_SECS")
            && let Ok(secs) = value.parse::<u64>()
        {
            config.dns.timeout = Duration::from_secs(secs);
        }

        if let Ok(value) = std::env::var("EMAIL_SIFT_DNS_ATTEMPTS")
            && let Ok(attempts) = value.parse::<usize>()
        {
            config.dns.attempts = attempts;
        }

        if let Ok(value) = std::env::var("EMAIL_SIFT_SYSTEM_RESOLVER")
            && is_truthy(&value)
        {
            config.dns.source = ResolverSource::System;
        }

        config
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.dns.timeout.is_zero() {
            return Err(SiftError::Config {
                field: "dns.timeout",
                reason: "must be greater than zero".into(),
            });
        }

        if self.dns.attempts == 0 {
            return Err(SiftError::Config {
                field: "dns.attempts",
                reason: "at least one attempt is required".into(),
            });
        }

        if self.pattern.trim().is_empty() {
            return Err(SiftError::Config {
                field: "pattern",
                reason: "extraction pattern is empty".into(),
            });
        }

        let paths = [&self.input, &self.output, &self.domains, &self.checkpoint];
        for (i, a) in paths.iter().enumerate() {
            if paths[i + 1..].contains(a) {
                return Err(SiftError::Config {
                    field: "paths",
                    reason: format!("{} is used for more than one file", a.display()),
                });
            }
        }

        Ok(())
    }
}

fn is_truthy(value: &str) -> bool {
    ["1", "true", "yes"]
        .iter()
        .any(|t| value.eq_ignore_ascii_case(t))
}
