//! Candidate extraction from raw text

use std::sync::LazyLock;

use regex::bytes::Regex;

use crate::error::{Result, SiftError};

/// Email-shaped pattern used when no other pattern is configured.
pub const DEFAULT_PATTERN: &str = r"[A-Za-z0-9.-]+@[A-Za-z0-9.-]+\.[A-Za-z0-9]{2,4}";

static DEFAULT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(DEFAULT_PATTERN).unwrap());

// name.surname[at]host[dot]tld
static OBFUSCATED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([A-Za-z0-9._-]+)\[at\]([A-Za-z0-9-]+(?:\[dot\][A-Za-z0-9-]+)+)").unwrap()
});

static DOT_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\[dot\]").unwrap());

/// Coarse scanner turning raw bytes into email candidates.
///
/// No validation happens here: anything shaped like an address is returned,
/// duplicates included, in the order it appears in the buffer.
#[derive(Debug, Clone)]
pub struct Extractor {
    regex: Regex,
    decode_obfuscated: bool,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            regex: DEFAULT_REGEX.clone(),
            decode_obfuscated: false,
        }
    }
}

impl Extractor {
    /// Build an extractor from a custom pattern
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| SiftError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            regex,
            decode_obfuscated: false,
        })
    }

    /// Also recognise `user[at]host[dot]tld` spellings and decode them.
    #[must_use]
    pub const fn with_obfuscated(mut self, enabled: bool) -> Self {
        self.decode_obfuscated = enabled;
        self
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Return every candidate found in `haystack`, ordered by position.
    #[must_use]
    pub fn extract(&self, haystack: &[u8]) -> Vec<String> {
        let mut found: Vec<(usize, String)> = self
            .regex
            .find_iter(haystack)
            .filter(|m| !m.is_empty())
            .map(|m| (m.start(), String::from_utf8_lossy(m.as_bytes()).into_owned()))
            .collect();

        if self.decode_obfuscated {
            found.extend(
                OBFUSCATED_REGEX
                    .captures_iter(haystack)
                    .filter_map(|cap| Some((cap.get(0)?.start(), decode(&cap[1], &cap[2])))),
            );
            found.sort_by_key(|(pos, _)| *pos);
        }

        found.into_iter().map(|(_, candidate)| candidate).collect()
    }
}

fn decode(local: &[u8], domain: &[u8]) -> String {
    let domain = DOT_TOKEN.replace_all(domain, &b"."[..]);
    format!(
        "{}@{}",
        String::from_utf8_lossy(local),
        String::from_utf8_lossy(&domain)
    )
}
