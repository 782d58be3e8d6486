use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One open, append-mode log slice for a security.
///
/// Owns the handle exclusively; rotation swaps a fresh `LogFile` in and
/// dropping the old one closes it.
#[derive(Debug)]
pub struct LogFile {
    file: File,
    path: PathBuf,
}

impl LogFile {
    /// Open `<code>_<YYYY-MM-DD_HHMM>.log` under `dir`, creating the
    /// file if needed.
    pub fn open(dir: &Path, code: &str, opened_at: DateTime<Local>) -> crate::Result<Self> {
        let filename = format!("{}_{}.log", code, opened_at.format("%Y-%m-%d_%H%M"));
        let path = dir.join(filename);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| format!("failed to open log file {}: {}", path.display(), e))?;

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a pre-serialized batch of lines.
    pub fn append(&mut self, batch: &str) -> crate::Result<()> {
        self.file.write_all(batch.as_bytes())?;
        Ok(())
    }

    /// Push written bytes through to durable storage.
    pub fn sync(&mut self) -> crate::Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}
