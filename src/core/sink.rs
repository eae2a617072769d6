//! Sink trait for log output destinations

use super::error::Result;

/// A destination that durably appends rendered log bytes.
///
/// A sink exclusively owns its destination handle. Loggers guarantee that at
/// most one thread calls into a sink at a time, so implementations need no
/// internal locking.
pub trait Sink: Send {
    /// Append `bytes` to the destination
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Push any buffered bytes down to the destination
    fn flush(&mut self) -> Result<()>;

    fn name(&self) -> &str;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
