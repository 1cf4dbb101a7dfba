//! Accepted-email records and the append-only output log

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{IoResultExt, Result};

/// One accepted address, stored as `{"Email":"..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    #[serde(rename = "Email")]
    pub email: String,
}

impl EmailRecord {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    /// Encode as a single newline-terminated JSON line
    pub fn to_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Append handle on the output log, the canonical set of accepted emails
#[derive(Debug)]
pub struct OutputLog {
    path: PathBuf,
    file: File,
}

impl OutputLog {
    /// Open for appending, creating the file if needed.
    ///
    /// A log whose last record was cut short by a crash gets a newline first,
    /// so the torn record stays on its own line and the next one decodes.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .with_path(&path, "open output log")?;

        if !ends_with_newline(&mut file).with_path(&path, "inspect output log")? {
            warn!(path = %path.display(), "Output log ends mid-record, terminating it");
            file.write_all(b"\n").with_path(&path, "repair output log")?;
        }
        Ok(Self { path, file })
    }

    #[cfg(test)]
    pub(crate) const fn from_file(path: PathBuf, file: File) -> Self {
        Self { path, file }
    }

    /// Write one record as a single append
    pub fn append(&mut self, record: &EmailRecord) -> Result<()> {
        let line = record.to_line()?;
        self.file
            .write_all(line.as_bytes())
            .with_path(&self.path, "append output log")
    }

    /// Flush and sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush().with_path(&self.path, "flush output log")?;
        self.file.sync_all().with_path(&self.path, "sync output log")
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// True for an empty file too
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
