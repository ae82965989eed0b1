// SPDX-License-Identifier: MIT

//! `RecoveryManager`: the per-task recovery state machine.
//!
//! What would elsewhere be an inheritance hierarchy of recovery states
//! becomes a tagged `State` enum; what would be virtual-dispatch default
//! handlers become explicit match arms on the current state, logging and
//! queuing unanswered requests instead of silently ignoring them.

use std::collections::BTreeMap;
use std::sync::Arc;

use causalrt_core::{EpochId, PartitionId, VertexId};
use causalrt_wire::{DeterminantRequestEvent, DeterminantResponseEvent, InFlightLogRequestEvent};
use parking_lot::Mutex;

use crate::error::RuntimeError;
use crate::subpartition::PipelinedSubpartition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Standby,
    WaitingConnections,
    WaitingDeterminants,
    ReplayingDeterminants,
    Running,
}

struct Inner {
    state: State,
    expected_channels: u32,
    ready_channels: u32,
    expected_peer_responses: u32,
    received_responses: u32,
    merged_response: Option<DeterminantResponseEvent>,
    correlation_id: u64,
    next_correlation_id: u64,
    failed_vertex: Option<VertexId>,
    record_count_target: u32,
    records_replayed: u32,
    unanswered_in_flight_log_requests: Vec<InFlightLogRequestEvent>,
    arena: BTreeMap<(PartitionId, u32), Arc<PipelinedSubpartition>>,
}

/// Drives one task's recovery after a failure is detected upstream: collects
/// determinants from peers, replays them into the operator deterministically,
/// and only then returns the task's subpartitions to normal dispatch.
///
/// Internally synchronized per the concurrency model (driven from the task
/// thread and the network I/O callback thread).
pub struct RecoveryManager {
    inner: Mutex<Inner>,
}

impl RecoveryManager {
    pub fn new(expected_channels: u32, expected_peer_responses: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: State::Standby,
                expected_channels,
                ready_channels: 0,
                expected_peer_responses,
                received_responses: 0,
                merged_response: None,
                correlation_id: 0,
                next_correlation_id: 1,
                failed_vertex: None,
                record_count_target: 0,
                records_replayed: 0,
                unanswered_in_flight_log_requests: Vec::new(),
                arena: BTreeMap::new(),
            }),
        }
    }

    /// Registers a subpartition this manager may later be asked to replay,
    /// indexed the way the design notes describe: by `(PartitionId, index)`
    /// rather than by owned handle, so the manager never needs a cyclic
    /// reference back to its owning task. Fails if the subpartition's
    /// in-flight log was already closed by a prior `release()` — a released
    /// subpartition has nothing left to replay and must not be handed to a
    /// new recovery attempt.
    pub fn register_subpartition(
        &self,
        partition_id: PartitionId,
        subpartition_index: u32,
        subpartition: Arc<PipelinedSubpartition>,
    ) -> Result<(), RuntimeError> {
        if subpartition.in_flight_log_is_closed() {
            return Err(causalrt_storage::StorageError::LogClosed.into());
        }
        self.inner.lock().arena.insert((partition_id, subpartition_index), subpartition);
        Ok(())
    }

    pub fn state_is_running(&self) -> bool {
        self.inner.lock().state == State::Running
    }

    /// `Standby --start_recovery--> WaitingConnections`. Fails if recovery is
    /// already underway.
    pub fn notify_start_recovery(&self, failed_vertex: VertexId) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        if inner.state != State::Standby {
            return Err(RuntimeError::Invariant(format!(
                "start_recovery while in {:?}",
                inner.state
            )));
        }
        inner.failed_vertex = Some(failed_vertex);
        inner.ready_channels = 0;
        inner.state = State::WaitingConnections;
        tracing::info!(vertex = failed_vertex.0, "recovery started");
        Ok(())
    }

    /// A sibling input channel has finished attaching. Once every expected
    /// channel is ready, transitions to `WaitingDeterminants` and returns the
    /// `DeterminantRequestEvent` to broadcast upstream — `None` while still
    /// waiting on more channels or outside `WaitingConnections`.
    pub fn notify_new_input_channel(
        &self,
        _subpartition_index: u32,
        _num_dedupe: u32,
    ) -> Option<DeterminantRequestEvent> {
        let mut inner = self.inner.lock();
        if inner.state != State::WaitingConnections {
            tracing::debug!(state = ?inner.state, "new input channel outside WaitingConnections, recorded only");
            return None;
        }
        inner.ready_channels += 1;
        if inner.ready_channels < inner.expected_channels {
            return None;
        }
        let correlation_id = inner.next_correlation_id;
        inner.next_correlation_id += 1;
        inner.correlation_id = correlation_id;
        inner.state = State::WaitingDeterminants;
        let failed_vertex = inner.failed_vertex.unwrap_or(VertexId(0));
        tracing::info!(correlation_id, "all channels ready, requesting determinants");
        Some(DeterminantRequestEvent { failed_vertex, upstream_correlation_id: correlation_id })
    }

    pub fn notify_new_output_channel(&self, partition_id: PartitionId, subpartition_index: u32) {
        tracing::debug!(?partition_id, subpartition_index, "new output channel attached during recovery");
    }

    /// Merges `resp` into the accumulator. Once
    /// `expected_peer_responses` have arrived, transitions to
    /// `ReplayingDeterminants` and returns the merged response for the
    /// caller to replay into the operator; `None` while more are expected.
    pub fn notify_determinant_response(
        &self,
        resp: DeterminantResponseEvent,
    ) -> Option<DeterminantResponseEvent> {
        let mut inner = self.inner.lock();
        if inner.state != State::WaitingDeterminants {
            tracing::debug!(state = ?inner.state, "determinant response outside WaitingDeterminants, dropped");
            return None;
        }
        inner.merged_response = Some(match inner.merged_response.take() {
            Some(existing) => causalrt_wire::merge_responses(existing, resp),
            None => resp,
        });
        inner.received_responses += 1;
        if inner.received_responses < inner.expected_peer_responses {
            return None;
        }
        inner.state = State::ReplayingDeterminants;
        tracing::info!("all determinant responses received, replaying");
        inner.merged_response.clone()
    }

    /// Arms the record-count target the replay must reach before the manager
    /// returns to `Running`. Called once the caller knows how many records
    /// the merged determinant response will replay.
    pub fn set_record_count_target(&self, target: u32) {
        let mut inner = self.inner.lock();
        inner.record_count_target = target;
        inner.records_replayed = 0;
    }

    /// Call once per record replayed into the operator while
    /// `ReplayingDeterminants`. Once the target is reached, transitions to
    /// `Running` and flushes every unanswered in-flight log request by
    /// calling `request_replay()` on its registered subpartition.
    pub fn notify_replay_progress(&self, records: u32) {
        let mut inner = self.inner.lock();
        if inner.state != State::ReplayingDeterminants {
            return;
        }
        inner.records_replayed += records;
        if inner.records_replayed < inner.record_count_target {
            return;
        }
        inner.state = State::Running;
        let pending = std::mem::take(&mut inner.unanswered_in_flight_log_requests);
        let arena_snapshot: Vec<_> = pending
            .into_iter()
            .filter_map(|e| {
                inner
                    .arena
                    .get(&(e.partition_id, e.subpartition_index))
                    .cloned()
                    .map(|sub| (e, sub))
            })
            .collect();
        drop(inner);
        for (event, subpartition) in arena_snapshot {
            tracing::info!(partition_id = ?event.partition_id, subpartition_index = event.subpartition_index, "flushing queued replay request");
            subpartition.request_replay();
        }
    }

    /// Routes an `InFlightLogRequestEvent`: if the target subpartition is
    /// still recovering its own in-flight state, queues it as unanswered;
    /// otherwise replays it immediately.
    pub fn notify_in_flight_log_request(&self, event: InFlightLogRequestEvent) {
        let mut inner = self.inner.lock();
        let subpartition =
            inner.arena.get(&(event.partition_id, event.subpartition_index)).cloned();
        let Some(subpartition) = subpartition else {
            tracing::warn!(partition_id = ?event.partition_id, subpartition_index = event.subpartition_index, "in-flight log request for unregistered subpartition");
            return;
        };
        if subpartition.is_recovering_in_flight_state() {
            inner.unanswered_in_flight_log_requests.push(event);
            return;
        }
        drop(inner);
        subpartition.request_replay();
    }

    pub fn notify_state_restoration_start(&self, checkpoint_id: EpochId) {
        tracing::info!(%checkpoint_id, "state restoration started");
    }

    pub fn notify_state_restoration_complete(&self, checkpoint_id: EpochId) {
        tracing::info!(%checkpoint_id, "state restoration complete");
    }
}

#[cfg(test)]
#[path = "fsm_tests.rs"]
mod tests;
