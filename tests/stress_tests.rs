//! Stress tests for concurrent delivery
//!
//! These tests verify:
//! - No record is lost or interleaved under concurrent producers
//! - Per-producer order is preserved in sync and async delivery
//! - SAFE backpressure bounds memory and blocks producers
//! - UNSAFE backpressure never blocks and grows the buffer

use parking_lot::Mutex;
use rust_async_logger::prelude::*;
use rust_async_logger::info;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const THREADS: usize = 8;
const PER_THREAD: usize = 1_000;

/// Memory sink whose writes wait until the test releases a gate
struct GatedSink {
    gate: Arc<Mutex<()>>,
    inner: MemorySink,
}

impl Sink for GatedSink {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let _open = self.gate.lock();
        self.inner.write(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }

    fn name(&self) -> &str {
        "gated"
    }
}

fn spawn_producers(logger: &Arc<Logger>) {
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(logger);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    info!(logger, "t{}-{}", t, i);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("producer panicked");
    }
}

/// Every line is intact and each producer's lines appear in emission order
fn assert_complete_and_ordered(lines: &[String]) {
    assert_eq!(lines.len(), THREADS * PER_THREAD);

    let mut next: HashMap<usize, usize> = HashMap::new();
    for line in lines {
        let (t, i) = line
            .trim_start_matches('t')
            .split_once('-')
            .map(|(t, i)| (t.parse::<usize>().unwrap(), i.parse::<usize>().unwrap()))
            .unwrap_or_else(|| panic!("malformed line {:?}", line));
        let expected = next.entry(t).or_insert(0);
        assert_eq!(i, *expected, "producer {} out of order", t);
        *expected += 1;
    }
    assert!(next.values().all(|&n| n == PER_THREAD));
}

#[test]
fn test_concurrent_sync_producers() {
    let capture = MemorySink::new();
    let logger = Arc::new(
        Logger::builder("stress-sync")
            .pattern("%m%n")
            .sink(capture.clone())
            .build()
            .expect("Failed to build logger"),
    );

    spawn_producers(&logger);

    assert_complete_and_ordered(&capture.lines());
    assert_eq!(capture.write_count(), THREADS * PER_THREAD);
    assert_eq!(logger.metrics().total_logged(), (THREADS * PER_THREAD) as u64);
}

#[test]
fn test_concurrent_async_safe_producers() {
    let capture = MemorySink::new();
    let logger = Arc::new(
        Logger::builder("stress-safe")
            .pattern("%m%n")
            .sink(capture.clone())
            .async_mode()
            .backpressure(Backpressure::Safe)
            .buffer_capacity(512)
            .build()
            .expect("Failed to build logger"),
    );

    spawn_producers(&logger);
    logger.shutdown().expect("Failed to shut down");

    assert_complete_and_ordered(&capture.lines());
    assert_eq!(logger.pipeline_capacity(), Some(512));
    assert_eq!(logger.metrics().dropped_count(), 0);
}

#[test]
fn test_concurrent_async_unsafe_producers() {
    let capture = MemorySink::new();
    let logger = Arc::new(
        Logger::builder("stress-unsafe")
            .pattern("%m%n")
            .sink(capture.clone())
            .async_mode()
            .backpressure(Backpressure::Unsafe)
            .buffer_capacity(512)
            .build()
            .expect("Failed to build logger"),
    );

    spawn_producers(&logger);
    logger.shutdown().expect("Failed to shut down");

    assert_complete_and_ordered(&capture.lines());
    assert_eq!(logger.metrics().block_events(), 0);
}

#[test]
fn test_safe_mode_blocks_and_stays_bounded() {
    let gate = Arc::new(Mutex::new(()));
    let capture = MemorySink::new();
    let logger = Arc::new(
        Logger::builder("bounded")
            .pattern("%m%n")
            .sink(GatedSink {
                gate: Arc::clone(&gate),
                inner: capture.clone(),
            })
            .async_mode()
            .backpressure(Backpressure::Safe)
            .buffer_capacity(256)
            .build()
            .expect("Failed to build logger"),
    );

    let held = gate.lock();
    let producer = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || {
            for i in 0..100 {
                info!(logger, "{:031}", i);
            }
        })
    };

    thread::sleep(Duration::from_millis(300));
    assert!(!producer.is_finished(), "producer should be blocked on a full buffer");
    assert!(logger.metrics().block_events() > 0);
    assert_eq!(logger.pipeline_capacity(), Some(256));

    drop(held);
    producer.join().expect("producer panicked");
    logger.shutdown().expect("Failed to shut down");

    assert_eq!(capture.lines().len(), 100);
    assert_eq!(logger.pipeline_capacity(), Some(256));
}

#[test]
fn test_unsafe_mode_never_blocks_and_grows() {
    let gate = Arc::new(Mutex::new(()));
    let capture = MemorySink::new();
    let logger = Logger::builder("unbounded")
        .pattern("%m%n")
        .sink(GatedSink {
            gate: Arc::clone(&gate),
            inner: capture.clone(),
        })
        .async_mode()
        .backpressure(Backpressure::Unsafe)
        .buffer_capacity(256)
        .build()
        .expect("Failed to build logger");

    let held = gate.lock();
    for i in 0..1_000 {
        info!(logger, "{:031}", i);
    }

    assert_eq!(logger.metrics().block_events(), 0);
    assert!(logger.pipeline_capacity().unwrap_or(0) > 256);

    drop(held);
    logger.shutdown().expect("Failed to shut down");

    let lines = capture.lines();
    assert_eq!(lines.len(), 1_000);
    assert_eq!(lines[999], format!("{:031}", 999));
}

#[test]
fn test_independent_async_loggers() {
    let sinks: Vec<MemorySink> = (0..4).map(|_| MemorySink::new()).collect();
    let loggers: Vec<Arc<Logger>> = sinks
        .iter()
        .enumerate()
        .map(|(n, sink)| {
            Arc::new(
                Logger::builder(format!("independent-{}", n))
                    .pattern("%c %m%n")
                    .sink(sink.clone())
                    .async_mode()
                    .buffer_capacity(1024)
                    .build()
                    .expect("Failed to build logger"),
            )
        })
        .collect();

    let handles: Vec<_> = loggers
        .iter()
        .map(|logger| {
            let logger = Arc::clone(logger);
            thread::spawn(move || {
                for i in 0..500 {
                    info!(logger, "{}", i);
                }
                logger.shutdown().expect("Failed to shut down");
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer panicked");
    }

    for (n, sink) in sinks.iter().enumerate() {
        let lines = sink.lines();
        assert_eq!(lines.len(), 500);
        assert!(lines.iter().all(|l| l.starts_with(&format!("independent-{} ", n))));
    }
}
