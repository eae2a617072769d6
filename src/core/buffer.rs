//! Growable byte buffer used to batch rendered records
//!
//! A [`ByteBuffer`] keeps separate read and write cursors over one contiguous
//! allocation. Producers append at the write cursor, consumers read the
//! `[read, write)` window, and two buffers can trade their contents in O(1)
//! with [`ByteBuffer::swap`], which is how the asynchronous pipeline hands a
//! full generation to its consumer while producers keep writing.

use super::error::{LoggerError, Result};

/// Initial capacity of a pipeline buffer (10 MiB)
pub const DEFAULT_BUFFER_SIZE: usize = 10 * 1024 * 1024;

/// Below this capacity growth doubles; above it growth is linear (80 MiB)
pub const THRESHOLD_BUFFER_SIZE: usize = 80 * 1024 * 1024;

/// Linear growth step once the threshold is reached (10 MiB)
pub const INCREMENT_BUFFER_SIZE: usize = 10 * 1024 * 1024;

/// Contiguous byte storage with read/write cursors.
///
/// Invariant: `read <= write <= capacity`. Not synchronized; the owner
/// serializes access.
#[derive(Debug, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
    read: usize,
    write: usize,
}

impl ByteBuffer {
    /// Create a buffer with [`DEFAULT_BUFFER_SIZE`] bytes of storage
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::CapacityExceeded`] if the storage cannot be allocated
    pub fn new() -> Result<Self> {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }

    /// Create a buffer with `capacity` bytes of storage
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::CapacityExceeded`] if the storage cannot be allocated
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| LoggerError::capacity(capacity))?;
        data.resize(capacity, 0);
        Ok(Self {
            data,
            read: 0,
            write: 0,
        })
    }

    /// Append `bytes`, growing the storage first if it is too small
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::CapacityExceeded`] if growth fails. The buffer is
    /// left unchanged in that case.
    pub fn push(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_writable(bytes.len())?;
        let end = self.write + bytes.len();
        self.data[self.write..end].copy_from_slice(bytes);
        self.write = end;
        Ok(())
    }

    /// Unread bytes, `[read, write)`
    #[inline]
    pub fn readable(&self) -> &[u8] {
        &self.data[self.read..self.write]
    }

    /// Mark `n` bytes as consumed
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds [`readable_len`](Self::readable_len).
    pub fn advance_read(&mut self, n: usize) {
        assert!(
            n <= self.readable_len(),
            "advance_read({}) past write cursor ({} readable)",
            n,
            self.readable_len()
        );
        self.read += n;
    }

    /// Drop all content, keeping the storage
    #[inline]
    pub fn reset(&mut self) {
        self.read = 0;
        self.write = 0;
    }

    /// Exchange storage and cursors with `other`
    #[inline]
    pub fn swap(&mut self, other: &mut ByteBuffer) {
        std::mem::swap(self, other);
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn readable_len(&self) -> usize {
        self.write - self.read
    }

    #[inline]
    pub fn writable_len(&self) -> usize {
        self.data.len() - self.write
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.read == self.write
    }

    /// Read cursor position
    #[inline]
    pub fn read_pos(&self) -> usize {
        self.read
    }

    /// Write cursor position
    #[inline]
    pub fn write_pos(&self) -> usize {
        self.write
    }

    fn ensure_writable(&mut self, len: usize) -> Result<()> {
        if self.writable_len() >= len {
            return Ok(());
        }

        let capacity = self.capacity();
        let new_capacity = if capacity < THRESHOLD_BUFFER_SIZE {
            capacity.checked_mul(2).and_then(|c| c.checked_add(len))
        } else {
            capacity
                .checked_add(INCREMENT_BUFFER_SIZE)
                .and_then(|c| c.checked_add(len))
        }
        .ok_or_else(|| LoggerError::capacity(usize::MAX))?;

        self.data
            .try_reserve_exact(new_capacity - capacity)
            .map_err(|_| LoggerError::capacity(new_capacity))?;
        self.data.resize(new_capacity, 0);
        Ok(())
    }
}
