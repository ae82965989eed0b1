// SPDX-License-Identifier: MIT

//! Refcounted buffers flowing out of an operator into a subpartition.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use parking_lot::Mutex;

/// A refcounted memory segment, produced by an operator and handed once to a
/// subpartition, which then owns releasing or forwarding it.
///
/// Cloning a `Buffer` is a new share of the same backing storage; dropping
/// the last clone releases the backing allocation.
#[derive(Clone)]
pub struct Buffer {
    data: Arc<[u8]>,
    is_buffer: bool,
}

impl Buffer {
    pub fn new_payload(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into(), is_buffer: true }
    }

    pub fn new_event(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into(), is_buffer: false }
    }

    pub fn readable_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn is_buffer(&self) -> bool {
        self.is_buffer
    }

    /// True for control events (barriers, task events) as opposed to payload.
    pub fn is_event(&self) -> bool {
        !self.is_buffer
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of live shares of this buffer's backing storage. Tests use this
    /// to assert that `InFlightLog` truncation and replay-iterator teardown
    /// decrement refcounts to exactly zero.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.data)
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("readable_bytes", &self.readable_bytes())
            .field("is_buffer", &self.is_buffer)
            .finish()
    }
}

/// A write-view onto a buffer under construction.
///
/// At most one unfinished `BufferConsumer` may live in a subpartition's
/// queue at a time, and it must be at the tail (enforced by the owning
/// `PipelinedSubpartition`, not by this type). `is_finished` is a shared
/// flag rather than owned state: a `BufferConsumer` is handed to `add()` by
/// value, but the writer keeps a clone so it can call `finish()` on the
/// buffer after it is already queued.
#[derive(Clone)]
pub struct BufferConsumer {
    inner: Arc<Mutex<Vec<u8>>>,
    is_event: bool,
    is_finished: Arc<AtomicBool>,
}

impl BufferConsumer {
    pub fn new_payload() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
            is_event: false,
            is_finished: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn new_event() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
            is_event: true,
            is_finished: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Append bytes to the buffer under construction.
    pub fn write(&self, bytes: &[u8]) {
        self.inner.lock().extend_from_slice(bytes);
    }

    /// Mark that no more bytes will be appended. Idempotent, and visible to
    /// every clone of this consumer (including one already queued in a
    /// subpartition).
    pub fn finish(&self) {
        self.is_finished.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.is_finished.load(Ordering::SeqCst)
    }

    /// Snapshot the bytes written so far into an immutable, independently
    /// refcounted `Buffer`. Called by `PipelinedSubpartition::poll_buffer`
    /// each time it dispatches from the head of the queue.
    pub fn build(&self) -> Buffer {
        let snapshot: Arc<[u8]> = self.inner.lock().as_slice().into();
        if self.is_event {
            Buffer::new_event(snapshot)
        } else {
            Buffer::new_payload(snapshot)
        }
    }

    pub fn readable_bytes(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_event(&self) -> bool {
        self.is_event
    }
}

/// Result of a single `poll_buffer()` dispatch: the buffer itself plus
/// enough bookkeeping for the consumer to decide whether to keep reading.
#[derive(Debug, Clone)]
pub struct BufferAndBacklog {
    pub buffer: Buffer,
    pub more_available: bool,
    pub backlog: u32,
    pub next_is_event: bool,
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
