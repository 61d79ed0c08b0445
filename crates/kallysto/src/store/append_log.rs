//! Append-only text files: the audit log, definitions and include files.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{KallystoError, Result};

/// A file held open in append mode.
///
/// Every write is flushed immediately so that a crash never loses a line
/// that was reported as written.
#[derive(Debug)]
pub struct AppendLog {
    path: PathBuf,
    file: Option<File>,
}

impl AppendLog {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| KallystoError::io(&path, e))?;

        Ok(Self {
            path,
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the handle is still open.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Append `line` followed by a newline.
    pub fn append_line(&mut self, line: &str) -> Result<()> {
        self.append_raw(&format!("{}\n", line))
    }

    /// Append `text` exactly as given.
    pub fn append_raw(&mut self, text: &str) -> Result<()> {
        let file = self.file.as_mut().ok_or_else(|| {
            KallystoError::io(&self.path, std::io::Error::other("log is closed"))
        })?;

        file.write_all(text.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| KallystoError::io(&self.path, e))
    }

    /// Flush and release the handle. Later appends fail.
    pub fn close(&mut self) -> Result<()> {
        match self.file.take() {
            Some(mut file) => file.flush().map_err(|e| KallystoError::io(&self.path, e)),
            None => Ok(()),
        }
    }
}

impl Drop for AppendLog {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
