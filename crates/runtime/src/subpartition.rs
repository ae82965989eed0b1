// SPDX-License-Identifier: MIT

//! Output queue state machine: dispatch, log, replay, fail-trigger.
//!
//! A single `parking_lot::Mutex` serializes every access to the queue, the
//! in-flight log, and the replay cursor (per the concurrency model below).
//! Notifications to the read view are always computed under the
//! lock and delivered after it is released, to avoid inverting against the
//! consumer's own gate lock.

use std::collections::VecDeque;
use std::sync::Arc;

use causalrt_core::{Buffer, BufferAndBacklog, BufferConsumer, EpochId};
use causalrt_storage::{InFlightLog, InFlightLogIter};
use parking_lot::Mutex;

/// Notified when a subpartition transitions from empty to having data
/// available, or when its read view is released. Implemented by whatever
/// holds the consumer-side handle (a `LocalInputChannel`, a `LoopbackTransport`
/// registry entry, or a test double).
pub trait AvailabilityListener: Send + Sync {
    fn notify_data_available(&self);
    fn notify_view_released(&self);
}

/// An `AvailabilityListener` that does nothing; convenient for unit tests
/// that only care about dispatch content, not notification wiring.
#[derive(Default)]
pub struct NoopListener;

impl AvailabilityListener for NoopListener {
    fn notify_data_available(&self) {}
    fn notify_view_released(&self) {}
}

struct Inner {
    buffers: VecDeque<BufferConsumer>,
    in_flight_log: InFlightLog,
    flush_requested: bool,
    is_finished: bool,
    is_released: bool,
    read_view: Option<Arc<dyn AvailabilityListener>>,
    downstream_failed: bool,
    recovering_in_flight_state: bool,
    active_replay: Option<InFlightLogIter>,
    current_epoch: EpochId,
}

impl Inner {
    fn is_available_unsafe(&self) -> bool {
        matches!(self.buffers.front(), Some(c) if c.is_finished())
    }

    fn next_is_event_unsafe(&self) -> bool {
        matches!(self.buffers.front(), Some(c) if c.is_event())
    }

    fn backlog(&self) -> u32 {
        self.buffers.len() as u32
    }

    /// Drains every finished buffer at the head of the queue into the
    /// in-flight log without dispatching it to a consumer; used only while
    /// downstream has failed. A replay in progress does not drain new
    /// appends this way — they go to the tail for normal dispatch once the
    /// replay finishes.
    fn drain_finished_to_log(&mut self) {
        while matches!(self.buffers.front(), Some(c) if c.is_finished()) {
            let consumer = self.buffers.pop_front().expect("front checked Some above");
            let buffer = consumer.build();
            self.in_flight_log.log(self.current_epoch, buffer, true);
        }
    }
}

/// The output queue of one partition's subpartition. Wraps its state in a
/// single mutex per the concurrency model; every public method here is the
/// lock boundary.
pub struct PipelinedSubpartition {
    inner: Mutex<Inner>,
}

impl PipelinedSubpartition {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                buffers: VecDeque::new(),
                in_flight_log: InFlightLog::new(),
                flush_requested: false,
                is_finished: false,
                is_released: false,
                read_view: None,
                downstream_failed: false,
                recovering_in_flight_state: false,
                active_replay: None,
                current_epoch: EpochId::FIRST,
            }),
        }
    }

    pub fn set_read_view(&self, listener: Arc<dyn AvailabilityListener>) {
        self.inner.lock().read_view = Some(listener);
    }

    pub fn set_current_epoch(&self, epoch: EpochId) {
        self.inner.lock().current_epoch = epoch;
    }

    pub fn is_released(&self) -> bool {
        self.inner.lock().is_released
    }

    pub fn is_downstream_failed(&self) -> bool {
        self.inner.lock().downstream_failed
    }

    pub fn is_recovering_in_flight_state(&self) -> bool {
        self.inner.lock().recovering_in_flight_state
    }

    pub fn set_recovering_in_flight_state(&self, recovering: bool) {
        self.inner.lock().recovering_in_flight_state = recovering;
    }

    pub fn notify_downstream_checkpoint_complete(&self, n_buffers: u32) {
        self.inner.lock().in_flight_log.notify_downstream_checkpoint_complete(n_buffers);
    }

    pub fn in_flight_log_len(&self) -> usize {
        self.inner.lock().in_flight_log.len()
    }

    /// Enqueue a dispatched consumer. Returns `false` (and closes the
    /// consumer) if the subpartition is already finished or released.
    pub fn add(&self, consumer: BufferConsumer, finish: bool) -> bool {
        let mut listener_to_notify = None;
        let accepted;
        {
            let mut inner = self.inner.lock();
            if inner.is_finished || inner.is_released {
                drop(inner);
                drop(consumer);
                return false;
            }

            let was_available = inner.is_available_unsafe();

            // Only the tail consumer may be unfinished; pushing a new one
            // implicitly finishes whichever consumer was previously the
            // tail (its writer keeps a clone and may also finish it
            // directly, in which case this is a no-op).
            if let Some(previous_tail) = inner.buffers.back() {
                previous_tail.finish();
            }
            inner.buffers.push_back(consumer);

            // Edge-triggered: notify only on the empty-to-available
            // transition, not on every finished buffer already sitting in
            // the queue waiting to be polled.
            let became_available = !was_available && inner.is_available_unsafe();
            let should_notify =
                inner.read_view.is_some() && !inner.flush_requested && became_available;
            let notify_data_available = should_notify || finish;
            inner.is_finished |= finish;

            if inner.recovering_in_flight_state {
                // In the source design this signals a condvar; we have no
                // blocking producers in this crate, so there is nothing to
                // wake — the flag alone is enough to suppress notification.
            } else if inner.downstream_failed {
                inner.drain_finished_to_log();
            }

            if !inner.recovering_in_flight_state && notify_data_available {
                listener_to_notify = inner.read_view.clone();
            }
            accepted = true;
        }
        if let Some(listener) = listener_to_notify {
            listener.notify_data_available();
        }
        accepted
    }

    /// Dispatch the next buffer, from the active replay if any, else from
    /// the queued consumers. `None` while downstream has failed or this
    /// subpartition is still recovering its own in-flight state.
    pub fn poll_buffer(&self) -> Option<BufferAndBacklog> {
        let mut inner = self.inner.lock();
        if inner.downstream_failed || inner.recovering_in_flight_state {
            return None;
        }

        if inner.active_replay.is_some() {
            return Self::poll_from_replay(&mut inner);
        }
        Self::poll_from_consumers(&mut inner)
    }

    fn poll_from_replay(inner: &mut Inner) -> Option<BufferAndBacklog> {
        let replay = inner.active_replay.as_mut().expect("checked Some by caller");
        let buffer = replay.next()?;
        let more_available = replay.has_next() || inner.is_available_unsafe();
        if !replay.has_next() {
            tracing::info!("replay iterator exhausted");
            inner.active_replay = None;
        }
        Some(BufferAndBacklog {
            buffer,
            more_available,
            backlog: inner.backlog(),
            next_is_event: inner.next_is_event_unsafe(),
        })
    }

    fn poll_from_consumers(inner: &mut Inner) -> Option<BufferAndBacklog> {
        loop {
            let consumer = inner.buffers.front()?;
            let snapshot = consumer.build();
            let finished = consumer.is_finished();
            debug_assert!(
                finished || inner.buffers.len() == 1,
                "only the tail consumer may be unfinished"
            );

            if finished {
                inner.buffers.pop_front();
            }

            if snapshot.readable_bytes() == 0 && !finished {
                // Nothing to dispatch yet from this still-open consumer.
                return None;
            }
            if snapshot.readable_bytes() == 0 {
                // Empty finished buffer: recycle and try the next one.
                continue;
            }

            let epoch = inner.current_epoch;
            inner.in_flight_log.log(epoch, snapshot.clone(), finished);
            return Some(BufferAndBacklog {
                buffer: snapshot,
                more_available: inner.is_available_unsafe(),
                backlog: inner.backlog(),
                next_is_event: inner.next_is_event_unsafe(),
            });
        }
    }

    /// Sets `flush_requested` if the queue is non-empty, and (unless
    /// recovering) notifies the read view.
    pub fn flush(&self) {
        let mut listener_to_notify = None;
        {
            let mut inner = self.inner.lock();
            if !inner.buffers.is_empty() {
                inner.flush_requested = true;
                if !inner.recovering_in_flight_state {
                    listener_to_notify = inner.read_view.clone();
                }
            }
        }
        if let Some(listener) = listener_to_notify {
            listener.notify_data_available();
        }
    }

    /// Idempotent. Closes and clears every queued consumer, closes the
    /// in-flight log, marks the subpartition released, and notifies the read
    /// view of release outside the lock.
    pub fn release(&self) {
        let mut listener_to_notify = None;
        {
            let mut inner = self.inner.lock();
            if inner.is_released {
                return;
            }
            inner.buffers.clear();
            inner.active_replay = None;
            inner.in_flight_log.close();
            inner.is_released = true;
            listener_to_notify = inner.read_view.take();
        }
        if let Some(listener) = listener_to_notify {
            listener.notify_view_released();
        }
    }

    /// Whether this subpartition's in-flight log was closed by a prior
    /// `release()`.
    pub fn in_flight_log_is_closed(&self) -> bool {
        self.inner.lock().in_flight_log.is_closed()
    }

    /// Marks downstream as failed, drains finished head buffers into the
    /// in-flight log, and returns `cause` so the caller can propagate a
    /// fail-consumer signal upstream of the downstream peer.
    pub fn send_fail_consumer_trigger(&self, cause: &str) {
        let mut inner = self.inner.lock();
        inner.downstream_failed = true;
        inner.drain_finished_to_log();
        tracing::warn!(cause, "downstream failed, draining to in-flight log");
    }

    /// Closes any prior replay iterator, installs a fresh one from the
    /// in-flight log (or none if it is empty), and clears `downstream_failed`.
    pub fn request_replay(&self) {
        let mut inner = self.inner.lock();
        inner.active_replay = inner.in_flight_log.get_in_flight_iterator();
        inner.downstream_failed = false;
        let remaining = inner.active_replay.as_ref().map(|i| i.number_remaining());
        tracing::info!(?remaining, "replay requested");
    }
}

impl Default for PipelinedSubpartition {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "subpartition_tests.rs"]
mod tests;
