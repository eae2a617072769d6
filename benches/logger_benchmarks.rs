//! Criterion benchmarks for rust_async_logger

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_async_logger::prelude::*;
use rust_async_logger::{ByteBuffer, LogRecord};
use std::sync::Arc;

/// Discards everything; isolates logger overhead from I/O
struct NullSink;

impl Sink for NullSink {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        black_box(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

fn null_logger(name: &str, delivery: DeliveryMode) -> Logger {
    Logger::builder(name)
        .sink(NullSink)
        .delivery(delivery)
        .build()
        .expect("Failed to build logger")
}

// ============================================================================
// Formatter Benchmarks
// ============================================================================

fn bench_formatter(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatter");
    group.throughput(Throughput::Elements(1));

    let record = LogRecord::new(LogLevel::Info, "src/main.rs", 42, "bench", "request handled");

    group.bench_function("default_pattern", |b| {
        let formatter = Formatter::default();
        b.iter(|| black_box(formatter.format(black_box(&record))));
    });

    group.bench_function("message_only", |b| {
        let formatter = Formatter::new("%m%n").expect("valid pattern");
        b.iter(|| black_box(formatter.format(black_box(&record))));
    });

    group.finish();
}

// ============================================================================
// Buffer Benchmarks
// ============================================================================

fn bench_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("byte_buffer");

    for size in [64usize, 1024] {
        let record = vec![b'x'; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("push_reset", size), &record, |b, record| {
            let mut buffer = ByteBuffer::with_capacity(64 * 1024).expect("allocation");
            b.iter(|| {
                if buffer.writable_len() < record.len() {
                    buffer.reset();
                }
                buffer.push(black_box(record)).expect("push");
            });
        });
    }

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_sync_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_logging");
    group.throughput(Throughput::Elements(1));

    let logger = null_logger("bench-sync", DeliveryMode::Sync);

    group.bench_function("info", |b| {
        b.iter(|| logger.info(file!(), line!(), black_box("sync message")));
    });

    group.finish();
}

fn bench_async_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("async_logging");
    group.throughput(Throughput::Elements(1));

    let logger = null_logger("bench-async", DeliveryMode::Async);

    group.bench_function("info", |b| {
        b.iter(|| logger.info(file!(), line!(), black_box("async message")));
    });

    group.finish();
    let _ = logger.shutdown();
}

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    let logger = Arc::new(null_logger("bench-concurrent", DeliveryMode::Async));

    group.bench_function("multi_thread_4", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let logger = Arc::clone(&logger);
                    std::thread::spawn(move || {
                        for _ in 0..100 {
                            logger.info(file!(), line!(), "concurrent message");
                        }
                    })
                })
                .collect();
            for handle in handles {
                let _ = handle.join();
            }
        });
    });

    group.finish();
    let _ = logger.shutdown();
}

// ============================================================================
// Level Filtering Benchmarks
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = null_logger("bench-filter", DeliveryMode::Sync);
    logger.set_level(LogLevel::Error);

    group.bench_function("filtered_out", |b| {
        b.iter(|| logger.debug(file!(), line!(), black_box("filtered")));
    });

    group.bench_function("filtered_macro", |b| {
        b.iter(|| rust_async_logger::debug!(logger, "filtered {}", black_box(1)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_formatter,
    bench_buffer,
    bench_sync_logging,
    bench_async_logging,
    bench_concurrent_logging,
    bench_level_filtering,
);
criterion_main!(benches);
