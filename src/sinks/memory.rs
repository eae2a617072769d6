//! In-memory sink
//!
//! Captures everything written to it in a shared byte vector. Clones share
//! the same storage, so a test (or an embedding application) can keep one
//! clone as a handle while the logger owns the other.

use crate::core::{Result, Sink};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    writes: usize,
}

/// Sink that appends into memory
///
/// # Example
///
/// ```
/// use rust_async_logger::sinks::MemorySink;
/// use rust_async_logger::Sink;
///
/// let handle = MemorySink::new();
/// let mut sink = handle.clone();
/// sink.write(b"captured\n").unwrap();
/// assert_eq!(handle.contents(), "captured\n");
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    captured: Arc<Mutex<Captured>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything captured so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.captured.lock().bytes).into_owned()
    }

    /// Everything captured so far
    pub fn bytes(&self) -> Vec<u8> {
        self.captured.lock().bytes.clone()
    }

    /// Captured content split into lines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Number of `write` calls received
    pub fn write_count(&self) -> usize {
        self.captured.lock().writes
    }

    pub fn clear(&self) {
        let mut captured = self.captured.lock();
        captured.bytes.clear();
        captured.writes = 0;
    }
}

impl Sink for MemorySink {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let mut captured = self.captured.lock();
        captured.bytes.extend_from_slice(bytes);
        captured.writes += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
