//! File sink implementation

use crate::core::{LoggerError, Result, Sink};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Open `path` for appending, creating missing parent directories.
///
/// With the `file` feature the file is also locked exclusively so that two
/// sinks never append to the same path at once.
pub(crate) fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", parent.display()),
                e,
            )
        })?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
        })?;

    #[cfg(feature = "file")]
    {
        use fs2::FileExt;
        file.try_lock_exclusive()
            .map_err(|_| LoggerError::file_lock(path.display().to_string()))?;
    }

    Ok(file)
}

/// Appends to a single file that never rotates
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Open (or create) `path` in append mode
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created, or if
    /// another sink already holds the file.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes).map_err(|e| {
            LoggerError::file_appender(
                self.path.display().to_string(),
                format!("Failed to write log data: {}", e),
            )
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| {
            LoggerError::file_appender(
                self.path.display().to_string(),
                format!("Failed to flush: {}", e),
            )
        })
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
