//! Main logger implementation

use super::{
    buffer::DEFAULT_BUFFER_SIZE,
    error::{LoggerError, Result},
    formatter::Formatter,
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::LoggerMetrics,
    pipeline::AsyncPipeline,
    policy::{Backpressure, DeliveryMode, FailurePolicy},
    registry::LoggerRegistry,
    sink::Sink,
};
use crate::sinks::ConsoleSink;
use parking_lot::Mutex;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

type SinkList = Vec<Box<dyn Sink>>;

/// Level-gated entry point that renders records and delivers them to sinks.
///
/// A synchronous logger writes to and flushes every sink before the
/// emitting call returns. An asynchronous logger pushes the rendered bytes
/// into its [`AsyncPipeline`] and a background thread fans them out later,
/// in the same order.
pub struct Logger {
    name: String,
    min_level: AtomicU8,
    formatter: Arc<Formatter>,
    sinks: Arc<Mutex<SinkList>>,
    pipeline: Option<AsyncPipeline>,
    metrics: Arc<LoggerMetrics>,
    failure_policy: FailurePolicy,
}

impl Logger {
    /// Start building a logger called `name`
    ///
    /// # Example
    /// ```
    /// use rust_async_logger::prelude::*;
    ///
    /// let logger = Logger::builder("app")
    ///     .min_level(LogLevel::Info)
    ///     .pattern("[%p] %m%n")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(logger.name(), "app");
    /// ```
    #[must_use]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    fn synchronous(
        name: String,
        min_level: LogLevel,
        formatter: Arc<Formatter>,
        sinks: SinkList,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self {
            name,
            min_level: AtomicU8::new(min_level as u8),
            formatter,
            sinks: Arc::new(Mutex::new(sinks)),
            pipeline: None,
            metrics: Arc::new(LoggerMetrics::new()),
            failure_policy,
        }
    }

    /// The default `root` logger: synchronous, default pattern, console output
    pub(crate) fn root() -> Self {
        Self::synchronous(
            "root".to_string(),
            LogLevel::Debug,
            Arc::new(Formatter::default()),
            vec![Box::new(ConsoleSink::new())],
            FailurePolicy::default(),
        )
    }

    fn asynchronous(
        name: String,
        min_level: LogLevel,
        formatter: Arc<Formatter>,
        sinks: SinkList,
        failure_policy: FailurePolicy,
        backpressure: Backpressure,
        buffer_capacity: usize,
    ) -> Result<Self> {
        let mut logger = Self::synchronous(name, min_level, formatter, sinks, failure_policy);

        let sinks = Arc::clone(&logger.sinks);
        let metrics = Arc::clone(&logger.metrics);
        let pipeline = AsyncPipeline::spawn(
            &logger.name,
            backpressure,
            buffer_capacity,
            Arc::clone(&logger.metrics),
            move |generation| {
                let mut sinks = sinks.lock();
                fan_out(&mut sinks, generation, &metrics, failure_policy);
                flush_all(&mut sinks, &metrics, failure_policy);
            },
        )?;

        logger.pipeline = Some(pipeline);
        Ok(logger)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current threshold
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.min_level.load(Ordering::Relaxed)).unwrap_or(LogLevel::Off)
    }

    /// Change the threshold; calls already past the gate keep the old one
    pub fn set_level(&self, level: LogLevel) {
        self.min_level.store(level as u8, Ordering::Relaxed);
    }

    /// Whether a record at `level` would be rendered and delivered
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && level as u8 >= self.min_level.load(Ordering::Relaxed)
    }

    pub fn formatter(&self) -> &Arc<Formatter> {
        &self.formatter
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        if self.pipeline.is_some() {
            DeliveryMode::Async
        } else {
            DeliveryMode::Sync
        }
    }

    #[inline]
    pub fn is_async(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Backpressure mode of the pipeline, for asynchronous loggers
    pub fn backpressure(&self) -> Option<Backpressure> {
        self.pipeline.as_ref().map(AsyncPipeline::mode)
    }

    /// Current producer buffer capacity, for asynchronous loggers
    pub fn pipeline_capacity(&self) -> Option<usize> {
        self.pipeline.as_ref().map(AsyncPipeline::producer_capacity)
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.lock().len()
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use rust_async_logger::Logger;
    ///
    /// let logger = Logger::builder("metrics").build().unwrap();
    /// logger.debug(file!(), line!(), "counted");
    /// assert_eq!(logger.metrics().total_logged(), 1);
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Emit `message` at `level` from `file:line`
    ///
    /// Below the threshold this returns without building a record.
    pub fn log(&self, level: LogLevel, file: &str, line: u32, message: &str) {
        if !self.is_enabled(level) {
            return;
        }

        let record = LogRecord::new(level, file, line, &self.name, message);
        match self.formatter.format(&record) {
            Ok(rendered) => self.dispatch(rendered.as_bytes()),
            Err(e) => {
                eprintln!("[LOGGER ERROR] Logger '{}' failed to render a record: {}", self.name, e);
                self.metrics.record_dropped();
            }
        }
    }

    fn dispatch(&self, bytes: &[u8]) {
        match self.pipeline {
            Some(ref pipeline) => match pipeline.push(bytes) {
                Ok(()) => {
                    self.metrics.record_logged();
                }
                Err(e) => self.alert_and_drop(&e),
            },
            None => {
                let mut sinks = self.sinks.lock();
                let written = fan_out(&mut sinks, bytes, &self.metrics, self.failure_policy);
                let flushed = flush_all(&mut sinks, &self.metrics, self.failure_policy);
                if written && flushed {
                    self.metrics.record_logged();
                } else {
                    self.metrics.record_dropped();
                }
            }
        }
    }

    /// Drop a record the pipeline refused, alerting on the first loss and every 1000th after
    fn alert_and_drop(&self, reason: &LoggerError) {
        let dropped_count = self.metrics.record_dropped();
        if dropped_count == 0 || (dropped_count + 1) % 1000 == 0 {
            eprintln!(
                "[LOGGER WARNING] Logger '{}' dropped {} records: {}",
                self.name,
                dropped_count + 1,
                reason
            );
        }
    }

    #[inline]
    pub fn debug(&self, file: &str, line: u32, message: &str) {
        self.log(LogLevel::Debug, file, line, message);
    }

    #[inline]
    pub fn info(&self, file: &str, line: u32, message: &str) {
        self.log(LogLevel::Info, file, line, message);
    }

    #[inline]
    pub fn warn(&self, file: &str, line: u32, message: &str) {
        self.log(LogLevel::Warn, file, line, message);
    }

    #[inline]
    pub fn error(&self, file: &str, line: u32, message: &str) {
        self.log(LogLevel::Error, file, line, message);
    }

    #[inline]
    pub fn fatal(&self, file: &str, line: u32, message: &str) {
        self.log(LogLevel::Fatal, file, line, message);
    }

    /// Flush every sink
    ///
    /// For asynchronous loggers this does not wait for buffered generations;
    /// use [`shutdown`](Self::shutdown) for that.
    ///
    /// # Errors
    ///
    /// Returns the first sink flush error; all sinks are still flushed.
    pub fn flush(&self) -> Result<()> {
        let mut sinks = self.sinks.lock();
        let mut first_error = None;
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.flush() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Stop the pipeline (draining buffered records) and flush every sink
    ///
    /// Records emitted afterwards on an asynchronous logger are dropped and
    /// counted. Synchronous loggers keep working.
    ///
    /// # Errors
    ///
    /// Returns the first sink flush error.
    pub fn shutdown(&self) -> Result<()> {
        if let Some(ref pipeline) = self.pipeline {
            pipeline.stop();
        }
        self.flush()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("pattern", &self.formatter.pattern())
            .field("delivery", &self.delivery_mode())
            .field("backpressure", &self.backpressure())
            .field("sinks", &self.sink_count())
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Some(ref pipeline) = self.pipeline {
            pipeline.stop();
        }

        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }

        let dropped = self.metrics.dropped_count();
        let failures = self.metrics.sink_failures();
        if dropped > 0 || failures > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger '{}' shutting down with {} dropped records (drop rate: {:.2}%) and {} sink failures",
                self.name,
                dropped,
                self.metrics.drop_rate(),
                failures
            );
        }
    }
}

/// Write `bytes` to every sink in order, returning whether all succeeded
fn fan_out(
    sinks: &mut SinkList,
    bytes: &[u8],
    metrics: &LoggerMetrics,
    policy: FailurePolicy,
) -> bool {
    let mut all_ok = true;

    for (idx, sink) in sinks.iter_mut().enumerate() {
        let attempts = if policy == FailurePolicy::RetryOnce { 2 } else { 1 };
        let mut outcome = Ok(());
        for _ in 0..attempts {
            outcome = write_isolated(sink.as_mut(), bytes, policy);
            if outcome.is_ok() {
                break;
            }
        }

        if let Err(reason) = outcome {
            metrics.record_sink_failure();
            if policy == FailurePolicy::FailFast {
                panic!("[LOGGER FATAL] Sink #{} ({}) failed: {}", idx, sink.name(), reason);
            }
            eprintln!("[LOGGER ERROR] Sink #{} ({}) failed: {}", idx, sink.name(), reason);
            all_ok = false;
        }
    }

    all_ok
}

/// One write attempt; a panicking sink is contained unless the policy is fail-fast
fn write_isolated(
    sink: &mut dyn Sink,
    bytes: &[u8],
    policy: FailurePolicy,
) -> std::result::Result<(), String> {
    if policy == FailurePolicy::FailFast {
        return sink.write(bytes).map_err(|e| e.to_string());
    }

    match panic::catch_unwind(AssertUnwindSafe(|| sink.write(bytes))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            Err(format!("panicked: {}", panic_msg))
        }
    }
}

/// Flush every sink, returning whether all succeeded
fn flush_all(sinks: &mut SinkList, metrics: &LoggerMetrics, policy: FailurePolicy) -> bool {
    let mut all_ok = true;

    for (idx, sink) in sinks.iter_mut().enumerate() {
        if let Err(e) = sink.flush() {
            metrics.record_sink_failure();
            if policy == FailurePolicy::FailFast {
                panic!("[LOGGER FATAL] Sink #{} ({}) flush failed: {}", idx, sink.name(), e);
            }
            eprintln!("[LOGGER ERROR] Sink #{} ({}) flush failed: {}", idx, sink.name(), e);
            all_ok = false;
        }
    }

    all_ok
}

/// Builder for constructing a [`Logger`] with a fluent API
///
/// Defaults: level DEBUG, pattern [`DEFAULT_PATTERN`](super::formatter::DEFAULT_PATTERN),
/// one console sink when none is added, synchronous delivery, SAFE
/// backpressure with a 10 MiB buffer for asynchronous delivery.
///
/// # Example
/// ```
/// use rust_async_logger::prelude::*;
///
/// let capture = MemorySink::new();
/// let logger = Logger::builder("worker")
///     .min_level(LogLevel::Warn)
///     .pattern("%c %p %m%n")
///     .sink(capture.clone())
///     .async_mode()
///     .backpressure(Backpressure::Safe)
///     .build()
///     .unwrap();
///
/// logger.warn(file!(), line!(), "disk almost full");
/// logger.shutdown().unwrap();
/// assert_eq!(capture.contents(), "worker WARN disk almost full\n");
/// ```
pub struct LoggerBuilder {
    name: String,
    min_level: LogLevel,
    pattern: Option<String>,
    formatter: Option<Arc<Formatter>>,
    sinks: SinkList,
    delivery: DeliveryMode,
    backpressure: Backpressure,
    buffer_capacity: usize,
    failure_policy: FailurePolicy,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_level: LogLevel::Debug,
            pattern: None,
            formatter: None,
            sinks: Vec::new(),
            delivery: DeliveryMode::Sync,
            backpressure: Backpressure::Safe,
            buffer_capacity: DEFAULT_BUFFER_SIZE,
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Compile `pattern` at build time
    #[must_use = "builder methods return a new value"]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self.formatter = None;
        self
    }

    /// Share an already compiled formatter
    #[must_use = "builder methods return a new value"]
    pub fn formatter(mut self, formatter: Arc<Formatter>) -> Self {
        self.formatter = Some(formatter);
        self.pattern = None;
        self
    }

    /// Add a sink; sinks receive records in the order they were added
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Add an already boxed sink
    #[must_use = "builder methods return a new value"]
    pub fn boxed_sink(mut self, sink: Box<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn delivery(mut self, mode: DeliveryMode) -> Self {
        self.delivery = mode;
        self
    }

    /// Deliver through a background consumer thread
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(self) -> Self {
        self.delivery(DeliveryMode::Async)
    }

    /// Set the backpressure mode used in asynchronous delivery
    #[must_use = "builder methods return a new value"]
    pub fn backpressure(mut self, mode: Backpressure) -> Self {
        self.backpressure = mode;
        self
    }

    /// Initial capacity of each pipeline buffer in bytes
    ///
    /// Under SAFE backpressure this is also the memory ceiling per buffer.
    #[must_use = "builder methods return a new value"]
    pub fn buffer_capacity(mut self, bytes: usize) -> Self {
        self.buffer_capacity = bytes;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Build the Logger
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty name or an invalid
    /// pattern, and an allocation or IO error if the asynchronous pipeline
    /// cannot be started.
    pub fn build(self) -> Result<Logger> {
        if self.name.is_empty() {
            return Err(LoggerError::config("Logger", "name must not be empty"));
        }

        let formatter = match (self.formatter, self.pattern) {
            (Some(formatter), _) => formatter,
            (None, Some(pattern)) => Arc::new(Formatter::new(pattern)?),
            (None, None) => Arc::new(Formatter::default()),
        };

        let mut sinks = self.sinks;
        if sinks.is_empty() {
            sinks.push(Box::new(ConsoleSink::new()));
        }

        match self.delivery {
            DeliveryMode::Sync => Ok(Logger::synchronous(
                self.name,
                self.min_level,
                formatter,
                sinks,
                self.failure_policy,
            )),
            DeliveryMode::Async => Logger::asynchronous(
                self.name,
                self.min_level,
                formatter,
                sinks,
                self.failure_policy,
                self.backpressure,
                self.buffer_capacity,
            ),
        }
    }

    /// Build the logger and register it in `registry`
    ///
    /// If a logger with the same name is already registered, that logger is
    /// returned and the new one is discarded.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_into(self, registry: &LoggerRegistry) -> Result<Arc<Logger>> {
        let logger = Arc::new(self.build()?);
        let name = logger.name().to_string();
        registry.add(logger);
        registry
            .get(&name)
            .ok_or_else(|| LoggerError::other(format!("logger '{}' vanished from registry", name)))
    }

    /// Build the logger and register it in the process-wide registry
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_global(self) -> Result<Arc<Logger>> {
        self.build_into(LoggerRegistry::global())
    }
}
