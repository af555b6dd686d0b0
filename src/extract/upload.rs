//! Scratch storage for uploads awaiting extraction.
//!
//! Every upload gets its own randomly named file, so concurrent requests
//! never share a path.  The returned [`NamedTempFile`] deletes the file when
//! dropped, which covers success, error and unwind alike.

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::extract::{ExtractError, FileKind};

#[derive(Debug, Clone)]
pub struct ScratchDir {
    dir: PathBuf,
}

impl ScratchDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `bytes` to a fresh file whose name ends in `kind`'s suffix (the
    /// audio decoder uses it as a format hint).
    pub fn persist(&self, kind: FileKind, bytes: &[u8]) -> Result<NamedTempFile, ExtractError> {
        std::fs::create_dir_all(&self.dir)?;

        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(kind.suffix())
            .tempfile_in(&self.dir)?;
        file.write_all(bytes)?;
        file.flush()?;

        log::debug!("Staged {} bytes at {}", bytes.len(), file.path().display());
        Ok(file)
    }
}
