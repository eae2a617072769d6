//! Double-buffered producer/consumer handoff
//!
//! Producers append rendered bytes to the *producer* buffer under a single
//! mutex. A dedicated consumer thread waits for data, swaps the producer
//! buffer with its own (empty) buffer in O(1), releases the mutex and hands
//! the whole generation to a callback. Producers keep appending to the fresh
//! buffer while the callback performs sink I/O.
//!
//! Under [`Backpressure::Safe`] a producer waits until the producer buffer has
//! room for its bytes, so memory stays bounded by the configured capacity.
//! Under [`Backpressure::Unsafe`] the producer never waits and the buffer
//! grows instead.
//!
//! Stopping is cooperative: [`AsyncPipeline::stop`] wakes everybody, lets the
//! consumer drain what is already buffered and joins it. If the consumer
//! thread dies, the pipeline marks itself stopped on the way out so no
//! producer stays blocked.

use super::buffer::ByteBuffer;
use super::error::{LoggerError, Result};
use super::metrics::LoggerMetrics;
use super::policy::Backpressure;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

struct State {
    producer: ByteBuffer,
    stopped: bool,
}

struct Shared {
    state: Mutex<State>,
    space_available: Condvar,
    data_available: Condvar,
    mode: Backpressure,
    metrics: Arc<LoggerMetrics>,
}

impl Shared {
    fn shut(&self) {
        self.state.lock().stopped = true;
        self.data_available.notify_all();
        self.space_available.notify_all();
    }
}

/// Marks the pipeline stopped when the consumer thread exits, however it exits
struct ConsumerGuard(Arc<Shared>);

impl Drop for ConsumerGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            let pending = self.0.state.lock().producer.readable_len();
            eprintln!(
                "[LOGGER CRITICAL] Async consumer thread died with {} bytes pending. \
                 Further pushes will be rejected.",
                pending
            );
        }
        self.0.shut();
    }
}

/// Asynchronous delivery pipeline with one background consumer thread
pub struct AsyncPipeline {
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncPipeline {
    /// Allocate both buffers and start the consumer thread
    ///
    /// `callback` receives each generation's bytes on the consumer thread, in
    /// the order the generations were sealed.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::CapacityExceeded`] if the buffers cannot be
    /// allocated, or an IO error if the thread cannot be spawned.
    pub fn spawn<F>(
        name: &str,
        mode: Backpressure,
        capacity: usize,
        metrics: Arc<LoggerMetrics>,
        callback: F,
    ) -> Result<Self>
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        let producer = ByteBuffer::with_capacity(capacity)?;
        let consumer = ByteBuffer::with_capacity(capacity)?;

        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                producer,
                stopped: false,
            }),
            space_available: Condvar::new(),
            data_available: Condvar::new(),
            mode,
            metrics,
        });

        let worker = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(format!("{}-consumer", name.replace('\0', "")))
            .spawn(move || consume(worker, consumer, callback))
            .map_err(|e| {
                LoggerError::io_operation(
                    "spawning consumer thread",
                    format!("pipeline for '{}'", name),
                    e,
                )
            })?;

        Ok(Self {
            shared,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Append `bytes` to the current generation
    ///
    /// Under [`Backpressure::Safe`] this blocks until the producer buffer has
    /// room. An empty producer buffer always accepts a push, growing if the
    /// record is larger than its capacity.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::LoggerStopped`] if the pipeline is stopped (or
    /// stops while waiting), and [`LoggerError::CapacityExceeded`] if the
    /// buffer cannot grow.
    pub fn push(&self, bytes: &[u8]) -> Result<()> {
        let shared = &*self.shared;
        let mut state = shared.state.lock();
        if state.stopped {
            return Err(LoggerError::LoggerStopped);
        }

        if shared.mode == Backpressure::Safe && !has_room(&state.producer, bytes.len()) {
            shared.metrics.record_block();
            while !state.stopped && !has_room(&state.producer, bytes.len()) {
                shared.space_available.wait(&mut state);
            }
            if state.stopped {
                return Err(LoggerError::LoggerStopped);
            }
        }

        state.producer.push(bytes)?;
        shared.data_available.notify_one();
        Ok(())
    }

    /// Stop accepting pushes, drain buffered data and join the consumer
    ///
    /// Producers blocked in a SAFE wait are released with
    /// [`LoggerError::LoggerStopped`]. Calling `stop` more than once is a no-op.
    pub fn stop(&self) {
        self.shared.shut();

        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                // Stopped from inside the callback; the loop exits on its own.
                return;
            }
            if let Err(e) = handle.join() {
                eprintln!("[LOGGER ERROR] Async consumer thread panicked: {:?}", e);
            }
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.state.lock().stopped
    }

    pub fn mode(&self) -> Backpressure {
        self.shared.mode
    }

    /// Current capacity of the producer buffer
    pub fn producer_capacity(&self) -> usize {
        self.shared.state.lock().producer.capacity()
    }

    /// Bytes waiting in the producer buffer for the next generation
    pub fn pending_bytes(&self) -> usize {
        self.shared.state.lock().producer.readable_len()
    }
}

impl Drop for AsyncPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

#[inline]
fn has_room(buffer: &ByteBuffer, len: usize) -> bool {
    buffer.writable_len() >= len || buffer.is_empty()
}

fn consume<F>(shared: Arc<Shared>, mut consumer: ByteBuffer, mut callback: F)
where
    F: FnMut(&[u8]),
{
    let _guard = ConsumerGuard(Arc::clone(&shared));

    loop {
        {
            let mut state = shared.state.lock();
            while !state.stopped && state.producer.is_empty() {
                shared.data_available.wait(&mut state);
            }
            if state.producer.is_empty() {
                break;
            }

            state.producer.swap(&mut consumer);
            if shared.mode == Backpressure::Safe {
                shared.space_available.notify_all();
            }
        }

        shared.metrics.record_generation();
        callback(consumer.readable());
        consumer.reset();
    }
}
