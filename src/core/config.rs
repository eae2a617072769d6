//! Serializable logger configuration
//!
//! A [`LoggerConfig`] describes a logger declaratively and can be loaded from
//! JSON:
//!
//! ```
//! use rust_async_logger::core::config::LoggerConfig;
//!
//! let config = LoggerConfig::from_json(r#"{
//!     "name": "ingest",
//!     "level": "warn",
//!     "pattern": "[%p] %m%n",
//!     "delivery": "async",
//!     "sinks": [{ "type": "console" }]
//! }"#).unwrap();
//!
//! let logger = config.build().unwrap();
//! assert!(logger.is_async());
//! ```

use super::{
    buffer::DEFAULT_BUFFER_SIZE,
    error::{LoggerError, Result},
    log_level::LogLevel,
    logger::{Logger, LoggerBuilder},
    policy::{Backpressure, DeliveryMode, FailurePolicy},
    sink::Sink,
};
use crate::sinks::{ConsoleSink, FileSink, RollingFileSink, TimeGap};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// One sink entry of a [`LoggerConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkConfig {
    Console,
    File {
        path: PathBuf,
    },
    RollBySize {
        base_name: String,
        max_bytes: u64,
    },
    RollByTime {
        base_name: String,
        gap: TimeGap,
    },
}

impl SinkConfig {
    /// Open the described sink
    ///
    /// # Errors
    ///
    /// Returns any error raised while opening the destination.
    pub fn open(&self) -> Result<Box<dyn Sink>> {
        let sink: Box<dyn Sink> = match self {
            SinkConfig::Console => Box::new(ConsoleSink::new()),
            SinkConfig::File { path } => Box::new(FileSink::new(path.clone())?),
            SinkConfig::RollBySize {
                base_name,
                max_bytes,
            } => Box::new(RollingFileSink::by_size(base_name.clone(), *max_bytes)?),
            SinkConfig::RollByTime { base_name, gap } => {
                Box::new(RollingFileSink::by_time(base_name.clone(), *gap)?)
            }
        };
        Ok(sink)
    }
}

/// Declarative description of a [`Logger`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfig {
    pub name: String,

    #[serde(default, deserialize_with = "level_from_str")]
    pub level: LogLevel,

    /// Pattern string; the default pattern when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Ordered sinks; one console sink when empty
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,

    #[serde(default)]
    pub delivery: DeliveryMode,

    #[serde(default)]
    pub backpressure: Backpressure,

    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn level_from_str<'de, D>(deserializer: D) -> std::result::Result<LogLevel, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl LoggerConfig {
    /// Configuration with every field at its default
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: LogLevel::Debug,
            pattern: None,
            sinks: Vec::new(),
            delivery: DeliveryMode::Sync,
            backpressure: Backpressure::Safe,
            buffer_capacity: DEFAULT_BUFFER_SIZE,
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Parse a JSON document
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::JsonError`] for malformed JSON, unknown fields
    /// or invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::JsonError`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Open every sink and return a builder carrying this configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero buffer capacity under
    /// asynchronous delivery, or the first sink that fails to open.
    pub fn into_builder(self) -> Result<LoggerBuilder> {
        if self.delivery == DeliveryMode::Async && self.buffer_capacity == 0 {
            return Err(LoggerError::config(
                "LoggerConfig",
                "buffer_capacity must be positive for async delivery",
            ));
        }

        let mut builder = Logger::builder(self.name)
            .min_level(self.level)
            .delivery(self.delivery)
            .backpressure(self.backpressure)
            .buffer_capacity(self.buffer_capacity)
            .failure_policy(self.failure_policy);

        if let Some(pattern) = self.pattern {
            builder = builder.pattern(pattern);
        }

        for sink in &self.sinks {
            builder = builder.boxed_sink(sink.open()?);
        }

        Ok(builder)
    }

    /// Build the described logger
    ///
    /// # Errors
    ///
    /// Same as [`into_builder`](Self::into_builder) and
    /// [`LoggerBuilder::build`].
    pub fn build(self) -> Result<Logger> {
        self.into_builder()?.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_minimal_json_uses_defaults() {
        let config = LoggerConfig::from_json(r#"{ "name": "minimal" }"#).unwrap();
        assert_eq!(config, LoggerConfig::new("minimal"));

        let logger = config.build().unwrap();
        assert_eq!(logger.level(), LogLevel::Debug);
        assert_eq!(logger.sink_count(), 1);
        assert!(!logger.is_async());
    }

    #[test]
    fn test_full_json() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("app.log");
        let base = dir.path().join("roll-");
        let json = format!(
            r#"{{
                "name": "full",
                "level": "Warning",
                "pattern": "%p %m%n",
                "delivery": "async",
                "backpressure": "unsafe",
                "buffer_capacity": 1024,
                "failure_policy": "retry_once",
                "sinks": [
                    {{ "type": "file", "path": {file:?} }},
                    {{ "type": "roll_by_size", "base_name": {base:?}, "max_bytes": 4096 }},
                    {{ "type": "roll_by_time", "base_name": "{base}t-", "gap": {{ "seconds": 30 }} }}
                ]
            }}"#,
            file = file.display().to_string(),
            base = base.display().to_string(),
        );

        let config = LoggerConfig::from_json(&json).unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.backpressure, Backpressure::Unsafe);
        assert_eq!(config.failure_policy, FailurePolicy::RetryOnce);
        assert_eq!(
            config.sinks[2],
            SinkConfig::RollByTime {
                base_name: format!("{}t-", base.display()),
                gap: TimeGap::Seconds(30),
            }
        );

        let logger = config.build().unwrap();
        assert!(logger.is_async());
        assert_eq!(logger.backpressure(), Some(Backpressure::Unsafe));
        assert_eq!(logger.sink_count(), 3);

        logger.warn(file!(), line!(), "configured");
        logger.shutdown().unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "WARN configured\n");
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let err = LoggerConfig::from_json(r#"{ "name": "x", "level": "loud" }"#).unwrap_err();
        assert!(matches!(err, LoggerError::JsonError(_)));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = LoggerConfig::from_json(r#"{ "name": "x", "colour": true }"#).unwrap_err();
        assert!(matches!(err, LoggerError::JsonError(_)));
    }

    #[test]
    fn test_bad_pattern_is_config_error() {
        let mut config = LoggerConfig::new("x");
        config.pattern = Some("%q".to_string());
        assert!(config.build().unwrap_err().is_config());
    }

    #[test]
    fn test_zero_async_capacity_is_rejected() {
        let mut config = LoggerConfig::new("x");
        config.delivery = DeliveryMode::Async;
        config.buffer_capacity = 0;
        assert!(config.build().unwrap_err().is_config());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = LoggerConfig::new("round");
        config.level = LogLevel::Error;
        config.sinks.push(SinkConfig::RollByTime {
            base_name: "logs/r-".to_string(),
            gap: TimeGap::Hour,
        });

        let json = config.to_json().unwrap();
        assert!(json.contains("\"ERROR\""));
        assert!(json.contains("\"roll_by_time\""));
        assert_eq!(LoggerConfig::from_json(&json).unwrap(), config);
    }
}
