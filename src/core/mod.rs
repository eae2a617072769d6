//! Core logger types and traits

pub mod buffer;
pub mod config;
pub mod error;
pub mod formatter;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod pipeline;
pub mod policy;
pub mod registry;
pub mod sink;

pub use buffer::{ByteBuffer, DEFAULT_BUFFER_SIZE, INCREMENT_BUFFER_SIZE, THRESHOLD_BUFFER_SIZE};
pub use config::{LoggerConfig, SinkConfig};
pub use error::{LoggerError, Result};
pub use formatter::{Directive, Formatter, DEFAULT_PATTERN, DEFAULT_TIME_FORMAT};
pub use log_level::LogLevel;
pub use log_record::LogRecord;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use pipeline::AsyncPipeline;
pub use policy::{Backpressure, DeliveryMode, FailurePolicy};
pub use registry::{get_logger, root_logger, shutdown_all, LoggerRegistry, ROOT_LOGGER_NAME};
pub use sink::Sink;
