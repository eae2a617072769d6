//! Sink implementations

pub mod console;
pub mod file;
pub mod memory;
pub mod rolling_file;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use memory::MemorySink;
pub use rolling_file::{RollStrategy, RollingFileSink, TimeGap};

pub use crate::core::Sink;
