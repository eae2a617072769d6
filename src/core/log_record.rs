//! Log record structure

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::thread::{self, ThreadId};

/// Snapshot of one log event.
///
/// Records borrow their strings from the emitting call and only live for the
/// duration of rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecord<'a> {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub file: &'a str,
    pub line: u32,
    pub thread_id: ThreadId,
    pub logger: &'a str,
    pub payload: &'a str,
}

impl<'a> LogRecord<'a> {
    /// Capture a record on the calling thread at the current time
    pub fn new(
        level: LogLevel,
        file: &'a str,
        line: u32,
        logger: &'a str,
        payload: &'a str,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            file,
            line,
            thread_id: thread::current().id(),
            logger,
            payload,
        }
    }

    /// Override the capture time
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_captures_calling_thread() {
        let record = LogRecord::new(LogLevel::Info, "main.rs", 7, "root", "hi");
        assert_eq!(record.thread_id, thread::current().id());
        let age = Utc::now() - record.timestamp;
        assert!(age >= chrono::Duration::zero() && age < chrono::Duration::seconds(5));

        let other = thread::spawn(|| LogRecord::new(LogLevel::Info, "a", 1, "b", "c").thread_id)
            .join()
            .unwrap();
        assert_ne!(other, record.thread_id);
    }

    #[test]
    fn test_record_at() {
        let at = DateTime::from_timestamp(42, 0).unwrap();
        let record = LogRecord::new(LogLevel::Warn, "lib.rs", 1, "x", "y").at(at);
        assert_eq!(record.timestamp.timestamp(), 42);
        assert_eq!(record.level, LogLevel::Warn);
    }
}
