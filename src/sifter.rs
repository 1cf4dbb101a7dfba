//! Candidate judgement shared by the file pipeline and host harvesting

use tracing::debug;

use crate::dedupe::DedupeIndex;
use crate::domain::{DomainValidator, DomainVerdict, NsLookup};
use crate::error::Result;
use crate::syntax::is_valid_syntax;

/// Fate of one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Already accepted earlier; not validated again
    Duplicate,
    BadSyntax,
    BadDomain(DomainVerdict),
    /// Passed every check. The caller persists it, then calls [`Sifter::accept`].
    Accepted,
}

/// Dedupe, syntax and domain checks in cost order
pub struct Sifter<L> {
    seen: DedupeIndex,
    domains: DomainValidator<L>,
}

impl<L: NsLookup> Sifter<L> {
    pub const fn new(seen: DedupeIndex, domains: DomainValidator<L>) -> Self {
        Self { seen, domains }
    }

    /// Decide whether `candidate` should be kept.
    ///
    /// Syntax is checked before the domain so malformed candidates never
    /// cost a lookup. The only error is a failed domains-log append.
    pub fn judge(&mut self, candidate: &str) -> Result<Decision> {
        if self.seen.seen(candidate) {
            return Ok(Decision::Duplicate);
        }

        if !is_valid_syntax(candidate) {
            debug!(candidate, "Rejected by syntax check");
            return Ok(Decision::BadSyntax);
        }

        let verdict = self.domains.validate(candidate)?;
        if !verdict.is_accepted() {
            debug!(candidate, ?verdict, "Rejected by domain check");
            return Ok(Decision::BadDomain(verdict));
        }

        Ok(Decision::Accepted)
    }

    /// Remember a candidate once it has been durably stored
    pub fn accept(&mut self, email: impl Into<String>) {
        self.seen.record(email);
    }

    #[must_use]
    pub const fn seen(&self) -> &DedupeIndex {
        &self.seen
    }

    #[must_use]
    pub const fn domains(&self) -> &DomainValidator<L> {
        &self.domains
    }
}
