//! Rolling file sink
//!
//! Writes to a file named from a base name and the local time at which the
//! file was opened, and switches to a fresh file when either a size threshold
//! is reached or the current time bucket changes.
//!
//! File names follow `{base}{YYYYMMDDhhmmss}[-{sequence}].log`; the sequence
//! suffix is only used by size-based rolling, where several files may be
//! opened within the same second.

use super::file::open_append;
use crate::core::{LoggerError, Result, Sink};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Length of one time bucket for time-based rolling
///
/// # Examples
///
/// ```
/// use rust_async_logger::sinks::TimeGap;
///
/// assert_eq!(TimeGap::Hour.as_secs(), 3600);
/// assert_eq!(TimeGap::Seconds(90).as_secs(), 90);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGap {
    Second,
    Minute,
    Hour,
    Day,
    /// An explicit bucket length; zero is treated as one second
    Seconds(u64),
}

impl TimeGap {
    #[must_use]
    pub fn as_secs(&self) -> u64 {
        match self {
            TimeGap::Second => 1,
            TimeGap::Minute => 60,
            TimeGap::Hour => 3600,
            TimeGap::Day => 24 * 3600,
            TimeGap::Seconds(secs) => (*secs).max(1),
        }
    }
}

/// When a [`RollingFileSink`] switches to a new file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollStrategy {
    /// Roll once the current file has received at least `max_bytes`
    Size { max_bytes: u64 },

    /// Roll whenever `now / gap` changes
    Time { gap: TimeGap },
}

impl RollStrategy {
    #[must_use]
    pub fn size(max_bytes: u64) -> Self {
        RollStrategy::Size { max_bytes }
    }

    #[must_use]
    pub fn time(gap: TimeGap) -> Self {
        RollStrategy::Time { gap }
    }
}

/// File sink that rolls over by size or by time
///
/// # Examples
///
/// ```no_run
/// use rust_async_logger::sinks::{RollingFileSink, TimeGap};
///
/// // ./logs/app-20250108103045-0.log, ./logs/app-20250108103112-1.log, ...
/// let by_size = RollingFileSink::by_size("./logs/app-", 64 * 1024 * 1024).unwrap();
///
/// // ./logs/hourly-20250108100000.log, ./logs/hourly-20250108110000.log, ...
/// let by_time = RollingFileSink::by_time("./logs/hourly-", TimeGap::Hour).unwrap();
/// ```
#[derive(Debug)]
pub struct RollingFileSink {
    base_name: String,
    strategy: RollStrategy,
    writer: Option<BufWriter<File>>,
    current_path: PathBuf,
    /// Bytes accounted to the current file
    current_size: u64,
    /// Time bucket recorded when the current file was opened
    bucket: i64,
    /// Next size-rolling sequence number
    sequence: u64,
    files_opened: u64,
}

impl RollingFileSink {
    /// Roll to a new file whenever `max_bytes` have been written to the current one
    ///
    /// # Errors
    ///
    /// Returns error if the first file cannot be created or opened
    pub fn by_size(base_name: impl Into<String>, max_bytes: u64) -> Result<Self> {
        Self::with_strategy(base_name, RollStrategy::size(max_bytes))
    }

    /// Roll to a new file whenever the `gap`-sized time bucket changes
    ///
    /// # Errors
    ///
    /// Returns error if the first file cannot be created or opened
    pub fn by_time(base_name: impl Into<String>, gap: TimeGap) -> Result<Self> {
        Self::with_strategy(base_name, RollStrategy::time(gap))
    }

    /// Create a rolling sink with an explicit strategy
    ///
    /// # Errors
    ///
    /// Returns error if the base name is empty or the first file cannot be opened
    pub fn with_strategy(base_name: impl Into<String>, strategy: RollStrategy) -> Result<Self> {
        let base_name = base_name.into();
        if base_name.is_empty() {
            return Err(LoggerError::config("RollingFileSink", "base name must not be empty"));
        }

        let mut sink = Self {
            base_name,
            strategy,
            writer: None,
            current_path: PathBuf::new(),
            current_size: 0,
            bucket: 0,
            sequence: 0,
            files_opened: 0,
        };
        sink.open_next(Local::now())?;
        Ok(sink)
    }

    /// Path of the file currently being written
    #[must_use]
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Bytes written to the current file
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Number of files opened so far, including the first one
    #[must_use]
    pub fn files_opened(&self) -> u64 {
        self.files_opened
    }

    #[must_use]
    pub fn strategy(&self) -> &RollStrategy {
        &self.strategy
    }

    fn bucket_of(&self, now: &DateTime<Local>) -> i64 {
        match self.strategy {
            RollStrategy::Time { gap } => now.timestamp().div_euclid(gap.as_secs() as i64),
            RollStrategy::Size { .. } => 0,
        }
    }

    fn should_roll(&self, now: &DateTime<Local>) -> bool {
        if self.writer.is_none() {
            return true;
        }
        match self.strategy {
            RollStrategy::Size { max_bytes } => self.current_size >= max_bytes,
            RollStrategy::Time { .. } => self.bucket_of(now) != self.bucket,
        }
    }

    fn file_name(&mut self, now: &DateTime<Local>) -> PathBuf {
        let stamp = now.format("%Y%m%d%H%M%S");
        let name = match self.strategy {
            RollStrategy::Size { .. } => {
                let sequence = self.sequence;
                self.sequence += 1;
                format!("{}{}-{}.log", self.base_name, stamp, sequence)
            }
            RollStrategy::Time { .. } => format!("{}{}.log", self.base_name, stamp),
        };
        PathBuf::from(name)
    }

    /// Close the current file (if any) and open the next one
    fn open_next(&mut self, now: DateTime<Local>) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.current_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        let path = self.file_name(&now);
        let file = open_append(&path)?;

        self.writer = Some(BufWriter::new(file));
        self.current_path = path;
        self.current_size = 0;
        self.bucket = self.bucket_of(&now);
        self.files_opened += 1;
        Ok(())
    }

    fn write_at(&mut self, bytes: &[u8], now: DateTime<Local>) -> Result<()> {
        if self.should_roll(&now) {
            self.open_next(now).map_err(|e| {
                LoggerError::file_rotation(self.base_name.clone(), e.to_string())
            })?;
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;
        writer.write_all(bytes).map_err(|e| {
            LoggerError::file_appender(
                self.current_path.display().to_string(),
                format!("Failed to write log data: {}", e),
            )
        })?;
        self.current_size += bytes.len() as u64;
        Ok(())
    }
}

impl Sink for RollingFileSink {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_at(bytes, Local::now())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.current_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.strategy {
            RollStrategy::Size { .. } => "roll_by_size",
            RollStrategy::Time { .. } => "roll_by_time",
        }
    }
}

impl Drop for RollingFileSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}
