use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use email_sift::{
    CheckpointPolicy, Config, DEFAULT_CHECKPOINT, DEFAULT_DOMAINS, DEFAULT_INPUT, DEFAULT_OUTPUT,
    DEFAULT_PATTERN, ResolverSource,
};

/// Extract, validate and deduplicate email addresses from a growing log file.
///
/// Re-running resumes from the byte offset stored in the checkpoint file.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Input file, one record of raw text per line
    #[arg(long, value_name = "FILE", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Output log of accepted emails
    #[arg(long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Log of domains confirmed to have nameservers
    #[arg(long, value_name = "FILE", default_value = DEFAULT_DOMAINS)]
    pub domains: PathBuf,

    /// Checkpoint file holding the number of input bytes processed
    #[arg(long = "persistent", value_name = "FILE", default_value = DEFAULT_CHECKPOINT)]
    pub checkpoint: PathBuf,

    /// Extraction pattern for email candidates
    #[arg(long = "regex", value_name = "PATTERN", default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Nameserver lookup timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub dns_timeout: Option<u64>,

    /// Attempts per nameserver lookup
    #[arg(long, value_name = "N")]
    pub dns_attempts: Option<usize>,

    /// Use the host resolver configuration instead of public resolvers
    #[arg(long)]
    pub system_resolver: bool,

    /// Checkpoint lines even when an accepted email could not be written
    #[arg(long)]
    pub lenient: bool,

    /// Also decode addresses written as user[at]host[dot]tld
    #[arg(long)]
    pub decode_obfuscated: bool,

    /// Stop after this many lines
    #[arg(long, value_name = "N")]
    pub max_lines: Option<usize>,

    /// Also scan a last line without a trailing newline (input is complete)
    #[arg(long)]
    pub scan_unterminated: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Layer the flags over `base`; flags win.
    pub fn apply(self, mut base: Config) -> Config {
        base.input = self.input;
        base.output = self.output;
        base.domains = self.domains;
        base.checkpoint = self.checkpoint;
        base.pattern = self.pattern;

        if let Some(secs) = self.dns_timeout {
            base.dns.timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = self.dns_attempts {
            base.dns.attempts = attempts;
        }
        if self.system_resolver {
            base.dns.source = ResolverSource::System;
        }
        if self.lenient {
            base.checkpoint_policy = CheckpointPolicy::Lenient;
        }
        base.decode_obfuscated |= self.decode_obfuscated;
        base.scan_unterminated |= self.scan_unterminated;
        if self.max_lines.is_some() {
            base.max_lines = self.max_lines;
        }
        base
    }

    pub const fn default_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
