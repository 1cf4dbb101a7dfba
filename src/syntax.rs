//! Strict structural check for extracted candidates

use std::sync::LazyLock;

use regex::Regex;

// Local part from the RFC 5322 atext set plus '.', then two or more DNS labels.
static STRICT_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .unwrap()
});

/// Whether `candidate` is a structurally valid address.
///
/// The whole string must match: leading or trailing whitespace, a doubled
/// `@`, or a bare single-label domain all fail.
#[must_use]
pub fn is_valid_syntax(candidate: &str) -> bool {
    STRICT_EMAIL.is_match(candidate)
}
