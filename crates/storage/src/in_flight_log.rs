// SPDX-License-Identifier: MIT

//! Per-subpartition ordered log of emitted buffers, epoch-scoped.
//!
//! Not internally locked: callers (`PipelinedSubpartition`) serialize access
//! under their own subpartition mutex, per the concurrency model.

use std::collections::VecDeque;

use causalrt_core::{Buffer, EpochId};

/// Ordered `(EpochId, Buffer)` retention for everything a subpartition has
/// dispatched but not yet had acknowledged by a downstream checkpoint.
#[derive(Default)]
pub struct InFlightLog {
    entries: VecDeque<(EpochId, Buffer)>,
    closed: bool,
    last_acked_epoch: Option<EpochId>,
}

impl InFlightLog {
    pub fn new() -> Self {
        Self { entries: VecDeque::new(), closed: false, last_acked_epoch: None }
    }

    /// Retain a share of `buffer` until its epoch is acknowledged or the log
    /// is closed. A no-op (with a warning) once closed. `is_last_of_consumer`
    /// marks a record boundary for tracing only; storage treats every
    /// logged buffer identically regardless of its value.
    pub fn log(&mut self, epoch: EpochId, buffer: Buffer, is_last_of_consumer: bool) {
        if self.closed {
            tracing::warn!(%epoch, "append to closed in-flight log ignored");
            return;
        }
        tracing::trace!(%epoch, is_last_of_consumer, "logging dispatched buffer");
        self.entries.push_back((epoch, buffer));
    }

    /// Drop the first `n_buffers` of the oldest un-acknowledged epoch, never
    /// reaching into the next epoch's own buffers even if `n_buffers`
    /// exceeds the oldest epoch's count. If that epoch is fully drained, the
    /// acknowledgement watermark advances. Released buffers are dropped
    /// exactly once, here.
    pub fn notify_downstream_checkpoint_complete(&mut self, n_buffers: u32) {
        if self.closed {
            return;
        }
        let Some(oldest_epoch) = self.entries.front().map(|(epoch, _)| *epoch) else {
            return;
        };
        let mut removed = 0u32;
        while removed < n_buffers {
            match self.entries.front() {
                Some((epoch, _)) if *epoch == oldest_epoch => {
                    self.entries.pop_front();
                    removed += 1;
                }
                _ => break,
            }
        }
        let epoch_emptied = !matches!(self.entries.front(), Some((epoch, _)) if *epoch == oldest_epoch);
        if epoch_emptied {
            self.last_acked_epoch = Some(oldest_epoch);
        }
        tracing::debug!(removed, remaining = self.entries.len(), "in-flight log truncated");
    }

    pub fn last_acked_epoch(&self) -> Option<EpochId> {
        self.last_acked_epoch
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A finite, forward-only, non-restartable snapshot of the log's current
    /// contents. Buffers appended after this call are never observed by it.
    /// `None` if the log is closed or currently empty.
    pub fn get_in_flight_iterator(&self) -> Option<InFlightLogIter> {
        if self.closed || self.entries.is_empty() {
            return None;
        }
        let items: VecDeque<Buffer> = self.entries.iter().map(|(_, b)| b.clone()).collect();
        Some(InFlightLogIter { items })
    }

    /// Close the log: further appends are dropped with a warning, and the
    /// backlog is released.
    pub fn close(&mut self) {
        self.closed = true;
        self.entries.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Forward-only cursor over an `InFlightLog` snapshot taken at construction.
pub struct InFlightLogIter {
    items: VecDeque<Buffer>,
}

impl InFlightLogIter {
    pub fn has_next(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn next(&mut self) -> Option<Buffer> {
        self.items.pop_front()
    }

    pub fn peek_next(&self) -> Option<&Buffer> {
        self.items.front()
    }

    pub fn number_remaining(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
#[path = "in_flight_log_tests.rs"]
mod tests;
