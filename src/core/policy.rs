//! Delivery policies
//!
//! [`Backpressure`] decides whether asynchronous producers wait for buffer
//! space, [`FailurePolicy`] decides what happens when a sink rejects a write,
//! and [`DeliveryMode`] picks between direct writes and the background
//! pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy applied by the asynchronous pipeline when the producer buffer is full
///
/// # Example
///
/// ```
/// use rust_async_logger::Backpressure;
///
/// // Default: producers wait, memory stays bounded
/// assert_eq!(Backpressure::default(), Backpressure::Safe);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backpressure {
    /// Block the producer until the consumer frees space
    ///
    /// Memory use is bounded by the configured buffer capacity.
    #[default]
    Safe,

    /// Never block; the producer buffer grows as needed
    ///
    /// Only use when bursts are known to be bounded.
    Unsafe,
}

impl fmt::Display for Backpressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backpressure::Safe => write!(f, "Safe"),
            Backpressure::Unsafe => write!(f, "Unsafe"),
        }
    }
}

/// How a logger delivers rendered records to its sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Write to every sink on the calling thread before returning
    #[default]
    Sync,
    /// Hand bytes to a background consumer thread
    Async,
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMode::Sync => write!(f, "Sync"),
            DeliveryMode::Async => write!(f, "Async"),
        }
    }
}

/// Reaction to a sink that fails to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Report on stderr, count the failure and continue with the next sink
    #[default]
    ReportAndDrop,

    /// Retry the failed write once before reporting and dropping
    RetryOnce,

    /// Panic on the first failure
    ///
    /// Intended for strict and test configurations where losing a record
    /// must never go unnoticed.
    FailFast,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::ReportAndDrop => write!(f, "ReportAndDrop"),
            FailurePolicy::RetryOnce => write!(f, "RetryOnce"),
            FailurePolicy::FailFast => write!(f, "FailFast"),
        }
    }
}
