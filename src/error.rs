//! Error types for the sift pipeline

use std::io;
use std::path::Path;

use thiserror::Error;

/// Errors that can occur while sifting emails out of input text
#[derive(Error, Debug)]
pub enum SiftError {
    /// Filesystem operation failed on one of the state files or the input
    #[error("I/O error during {operation} on {path}: {source}")]
    Io {
        path: String,
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// The configured extraction pattern does not compile
    #[error("Invalid extraction pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Configuration rejected before the run started
    #[error("Invalid value for {field}: {reason}")]
    Config { field: &'static str, reason: String },

    /// The DNS resolver could not be constructed
    #[error("Failed to initialise DNS resolver: {0}")]
    Resolver(String),

    /// An output record could not be encoded
    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SiftError {
    pub fn io(path: impl AsRef<Path>, operation: &'static str, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            operation,
            source,
        }
    }
}

/// Result type for sift operations
pub type Result<T> = std::result::Result<T, SiftError>;

/// Attach path and operation context to raw I/O results.
pub trait IoResultExt<T> {
    fn with_path(self, path: impl AsRef<Path>, operation: &'static str) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path(self, path: impl AsRef<Path>, operation: &'static str) -> Result<T> {
        self.map_err(|e| SiftError::io(path, operation, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_context_is_kept() {
        let res: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        match res.with_path("/tmp/input.json", "open input") {
            Err(SiftError::Io {
                path, operation, ..
            }) => {
                assert_eq!(path, "/tmp/input.json");
                assert_eq!(operation, "open input");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn display_mentions_field() {
        let e = SiftError::Config {
            field: "dns_timeout",
            reason: "must be greater than zero".into(),
        };
        assert!(e.to_string().contains("dns_timeout"));
    }
}
