//! Domain existence checks backed by a persistent cache

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};
use trust_dns_resolver::Resolver;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::proto::error::ProtoErrorKind;

use crate::error::{IoResultExt, Result, SiftError};

/// Result of a nameserver query for one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// At least one NS record came back
    Found(usize),
    /// The domain resolved but has no NS records, or does not exist
    Empty,
    TimedOut,
    Failed(String),
}

impl LookupOutcome {
    #[must_use]
    pub const fn has_nameservers(&self) -> bool {
        matches!(self, Self::Found(n) if *n > 0)
    }
}

/// Source of nameserver answers.
///
/// Implementations must never block indefinitely; a timeout is reported as
/// [`LookupOutcome::TimedOut`].
pub trait NsLookup {
    fn lookup_ns(&self, domain: &str) -> LookupOutcome;
}

impl<T: NsLookup + ?Sized> NsLookup for &T {
    fn lookup_ns(&self, domain: &str) -> LookupOutcome {
        (**self).lookup_ns(domain)
    }
}

/// Where the resolver takes its upstream servers from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverSource {
    /// Built-in public resolver set
    #[default]
    Public,
    /// Host configuration (`/etc/resolv.conf` on unix)
    System,
}

/// Blocking NS lookups over DNS
pub struct DnsLookup {
    resolver: Resolver,
}

impl DnsLookup {
    pub fn new(source: ResolverSource, timeout: Duration, attempts: usize) -> Result<Self> {
        let (config, mut opts) = match source {
            ResolverSource::Public => (ResolverConfig::default(), ResolverOpts::default()),
            ResolverSource::System => trust_dns_resolver::system_conf::read_system_conf()
                .map_err(|e| SiftError::Resolver(e.to_string()))?,
        };
        opts.timeout = timeout;
        opts.attempts = attempts;

        let resolver =
            Resolver::new(config, opts).map_err(|e| SiftError::Resolver(e.to_string()))?;
        Ok(Self { resolver })
    }
}

impl NsLookup for DnsLookup {
    fn lookup_ns(&self, domain: &str) -> LookupOutcome {
        // Fully qualified so no search suffix gets appended.
        let fqdn = if domain.ends_with('.') {
            domain.to_string()
        } else {
            format!("{domain}.")
        };

        match self.resolver.ns_lookup(fqdn.as_str()) {
            Ok(answer) => match answer.iter().count() {
                0 => LookupOutcome::Empty,
                n => LookupOutcome::Found(n),
            },
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => LookupOutcome::Empty,
                ResolveErrorKind::Timeout => LookupOutcome::TimedOut,
                ResolveErrorKind::Proto(p) if matches!(p.kind(), ProtoErrorKind::Timeout) => {
                    LookupOutcome::TimedOut
                }
                _ => LookupOutcome::Failed(e.to_string()),
            },
        }
    }
}

/// Append-only set of domains known to have nameservers.
///
/// Entries are lowercased; DNS names compare case-insensitively.
#[derive(Debug)]
pub struct DomainCache {
    path: PathBuf,
    domains: HashSet<String>,
}

impl DomainCache {
    /// Replay the domains log. A missing log is an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut domains = HashSet::new();

        match File::open(&path) {
            Ok(file) => {
                for line in BufReader::new(file).lines() {
                    let line = line.with_path(&path, "read domains log")?;
                    let domain = line.trim();
                    if !domain.is_empty() {
                        domains.insert(domain.to_ascii_lowercase());
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(SiftError::io(&path, "open domains log", e)),
        }

        info!(path = %path.display(), domains = domains.len(), "Loaded domain cache");
        Ok(Self { path, domains })
    }

    #[must_use]
    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(&domain.to_ascii_lowercase())
    }

    /// Persist `domain` and then remember it. Returns `false` if it was
    /// already cached, in which case nothing is written.
    pub fn insert(&mut self, domain: &str) -> Result<bool> {
        let domain = domain.to_ascii_lowercase();
        if self.domains.contains(&domain) {
            return Ok(false);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_path(&self.path, "open domains log")?;
        file.write_all(format!("{domain}\n").as_bytes())
            .with_path(&self.path, "append domains log")?;

        self.domains.insert(domain);
        Ok(true)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// How a candidate's domain was judged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainVerdict {
    /// Candidate has no `@`
    Malformed,
    /// Domain was already in the cache; no lookup made
    Cached,
    /// Lookup found nameservers; domain is now cached
    Confirmed,
    /// Lookup came back without nameservers. Not cached, retried next time.
    Rejected(LookupOutcome),
}

impl DomainVerdict {
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Cached | Self::Confirmed)
    }
}

/// Cache-first domain validation with NS lookup fallback
pub struct DomainValidator<L> {
    cache: DomainCache,
    lookup: L,
    lookups: usize,
}

impl<L: NsLookup> DomainValidator<L> {
    pub const fn new(cache: DomainCache, lookup: L) -> Self {
        Self {
            cache,
            lookup,
            lookups: 0,
        }
    }

    /// Judge the domain part of `candidate`.
    ///
    /// Errors only when a freshly confirmed domain cannot be written to the
    /// domains log; the domain then stays uncached.
    pub fn validate(&mut self, candidate: &str) -> Result<DomainVerdict> {
        let Some((_, domain)) = candidate.split_once('@') else {
            return Ok(DomainVerdict::Malformed);
        };

        if self.cache.contains(domain) {
            return Ok(DomainVerdict::Cached);
        }

        self.lookups += 1;
        let outcome = self.lookup.lookup_ns(domain);
        if !outcome.has_nameservers() {
            debug!(domain, ?outcome, "Domain has no nameservers");
            return Ok(DomainVerdict::Rejected(outcome));
        }

        self.cache.insert(domain)?;
        debug!(domain, "Domain confirmed and cached");
        Ok(DomainVerdict::Confirmed)
    }

    /// Number of network lookups issued so far
    #[must_use]
    pub const fn lookups(&self) -> usize {
        self.lookups
    }

    #[must_use]
    pub const fn cache(&self) -> &DomainCache {
        &self.cache
    }
}
