//! CLI entry point for the email sifter.

use anyhow::{Context, Result};
use clap::Parser;
use email_sift::{Config, DnsLookup, Pipeline};
use tracing::{debug, info};

mod cli;

use cli::Args;

fn main() -> Result<()> {
    // Parse before tracing so --help works without logs
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.default_log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let config = args.apply(Config::from_env());
    config.validate().context("invalid configuration")?;

    let lookup = DnsLookup::new(config.dns.source, config.dns.timeout, config.dns.attempts)?;
    let mut pipeline = Pipeline::new(config, lookup);
    let stats = pipeline
        .run()
        .with_context(|| format!("run aborted during {:?}", pipeline.phase()))?;

    info!(
        lines = stats.lines,
        candidates = stats.candidates,
        accepted = stats.accepted,
        duplicates = stats.duplicates,
        syntax_rejected = stats.syntax_rejected,
        domain_rejected = stats.domain_rejected,
        lookups = stats.lookups,
        write_failures = stats.write_failures,
        from = stats.start_offset,
        to = stats.end_offset,
        "Run complete"
    );

    Ok(())
}
