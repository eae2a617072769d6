//! # Rust Async Logger
//!
//! A pattern-formatted logging library with synchronous and asynchronous
//! delivery to pluggable sinks.
//!
//! ## Features
//!
//! - **Pattern formatting**: `%d{..}`, `%t`, `%c`, `%f`, `%l`, `%p`, `%T`, `%m`, `%n`, `%%`
//! - **Double-buffered async delivery**: one background consumer per logger,
//!   with blocking (SAFE) or growing (UNSAFE) backpressure
//! - **Sinks**: console, file, size- and time-rolled files, in-memory capture
//! - **Registry**: process-wide name lookup with an always-present `root` logger;
//!   call [`shutdown_all`] before exit to drain globally registered loggers
//! - **Configuration**: fluent builder or JSON via `serde`
//!
//! ## Example
//!
//! ```
//! use rust_async_logger::prelude::*;
//! use rust_async_logger::info;
//!
//! let capture = MemorySink::new();
//! let logger = Logger::builder("app")
//!     .pattern("%p:%m%n")
//!     .sink(capture.clone())
//!     .build()
//!     .unwrap();
//!
//! info!(logger, "abc");
//! assert_eq!(capture.contents(), "INFO:abc\n");
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        get_logger, root_logger, shutdown_all, Backpressure, DeliveryMode, FailurePolicy,
        Formatter, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics,
        LoggerRegistry, Result, Sink, SinkConfig,
    };
    pub use crate::sinks::{ConsoleSink, FileSink, MemorySink, RollingFileSink, TimeGap};
}

pub use core::{
    get_logger, root_logger, shutdown_all, AsyncPipeline, Backpressure, ByteBuffer,
    DeliveryMode, Directive, FailurePolicy, Formatter, LogLevel, LogRecord, Logger,
    LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, LoggerRegistry, Result, Sink,
    SinkConfig, DEFAULT_PATTERN,
};
pub use sinks::{ConsoleSink, FileSink, MemorySink, RollStrategy, RollingFileSink, TimeGap};
