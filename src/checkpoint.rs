//! Byte-offset checkpoint into the input file

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{IoResultExt, Result, SiftError};

/// Number of input bytes already accounted for.
///
/// The offset only ever lands on a line boundary. It is replaced on disk by
/// writing a sibling file and renaming it over the old one, so a reader sees
/// either the previous or the new value.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    path: PathBuf,
    offset: u64,
}

impl Checkpoint {
    /// Read the stored offset; a missing or unparseable file means 0.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let offset = match fs::read_to_string(&path) {
            Ok(contents) => parse_offset(&contents).unwrap_or_else(|| {
                warn!(path = %path.display(), "Unparseable checkpoint, starting from 0");
                0
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => 0,
            Err(e) => return Err(SiftError::io(&path, "read checkpoint", e)),
        };
        Ok(Self { path, offset })
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Move forward by `bytes` consumed from the input
    pub const fn advance(&mut self, bytes: u64) {
        self.offset += bytes;
    }

    /// Forget all progress. Only used when the input no longer matches.
    pub const fn reset(&mut self) {
        self.offset = 0;
    }

    /// Replace the checkpoint file with the current offset.
    ///
    /// The staged value is synced before the rename so a power loss cannot
    /// leave an empty checkpoint behind.
    pub fn persist(&self) -> Result<()> {
        let tmp = self.staging_path();
        let mut file = File::create(&tmp).with_path(&tmp, "create checkpoint")?;
        file.write_all(self.offset.to_string().as_bytes())
            .with_path(&tmp, "write checkpoint")?;
        file.sync_all().with_path(&tmp, "sync checkpoint")?;
        drop(file);
        fs::rename(&tmp, &self.path).with_path(&self.path, "replace checkpoint")
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn parse_offset(contents: &str) -> Option<u64> {
    contents.lines().next()?.trim().parse().ok()
}
