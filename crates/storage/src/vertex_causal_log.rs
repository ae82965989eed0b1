// SPDX-License-Identifier: MIT

//! Append-only per-`CausalLogId` determinant storage, epoch-indexed.

use std::collections::{BTreeMap, VecDeque};

use causalrt_core::EpochId;

/// One epoch's worth of appended determinant bytes for a single causal log.
#[derive(Debug, Clone)]
struct Segment {
    epoch: EpochId,
    bytes: Vec<u8>,
}

/// Ordered sequence of `(EpochId, bytes)` segments for every `CausalLogId`
/// produced by this vertex. Segments are append-only; `truncate` is the only
/// operation that removes them, and it only ever drops whole epochs at a
/// time, oldest first.
#[derive(Debug, Default)]
pub struct VertexCausalLog {
    segments: VecDeque<Segment>,
}

impl VertexCausalLog {
    pub fn new() -> Self {
        Self { segments: VecDeque::new() }
    }

    /// Append `bytes` to the segment for `epoch`, opening a new segment if
    /// the tail belongs to an earlier epoch (or the log is empty).
    pub fn append(&mut self, epoch: EpochId, bytes: &[u8]) {
        match self.segments.back_mut() {
            Some(tail) if tail.epoch == epoch => tail.bytes.extend_from_slice(bytes),
            _ => {
                debug_assert!(
                    match self.segments.back() {
                        Some(tail) => tail.epoch < epoch,
                        None => true,
                    },
                    "segments must be appended in non-decreasing epoch order"
                );
                self.segments.push_back(Segment { epoch, bytes: bytes.to_vec() });
            }
        }
    }

    /// Concatenation of every retained segment's bytes, in epoch order.
    /// This is what gets shipped over the wire in a `DeterminantDelta`.
    pub fn determinant_bytes(&self) -> Vec<u8> {
        let total: usize = self.segments.iter().map(|s| s.bytes.len()).sum();
        let mut out = Vec::with_capacity(total);
        for segment in &self.segments {
            out.extend_from_slice(&segment.bytes);
        }
        out
    }

    /// Drop every segment whose epoch is at or before `checkpoint_id`.
    pub fn truncate(&mut self, checkpoint_id: EpochId) {
        while let Some(front) = self.segments.front() {
            if front.epoch <= checkpoint_id {
                self.segments.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn oldest_epoch(&self) -> Option<EpochId> {
        self.segments.front().map(|s| s.epoch)
    }
}

/// All causal logs owned by a task, keyed by the `CausalLogId` they stream
/// determinants for. Uses a `BTreeMap` so iteration (e.g. when answering a
/// `DeterminantRequestEvent`) walks logs in their totally-ordered key order.
#[derive(Debug, Default)]
pub struct VertexCausalLogStore {
    logs: BTreeMap<causalrt_core::CausalLogId, VertexCausalLog>,
}

impl VertexCausalLogStore {
    pub fn new() -> Self {
        Self { logs: BTreeMap::new() }
    }

    pub fn append(&mut self, log_id: causalrt_core::CausalLogId, epoch: EpochId, bytes: &[u8]) {
        self.logs.entry(log_id).or_default().append(epoch, bytes);
    }

    pub fn get(&self, log_id: &causalrt_core::CausalLogId) -> Option<&VertexCausalLog> {
        self.logs.get(log_id)
    }

    /// Authorize truncation for every log up to and including `checkpoint_id`.
    pub fn notify_checkpoint_complete(&mut self, checkpoint_id: EpochId) {
        for log in self.logs.values_mut() {
            log.truncate(checkpoint_id);
        }
        tracing::debug!(checkpoint = %checkpoint_id, "truncated vertex causal logs");
    }

    pub fn iter(&self) -> impl Iterator<Item = (&causalrt_core::CausalLogId, &VertexCausalLog)> {
        self.logs.iter()
    }
}

#[cfg(test)]
#[path = "vertex_causal_log_tests.rs"]
mod tests;
