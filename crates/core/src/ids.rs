// SPDX-License-Identifier: MIT

//! Identifiers for epochs, vertices, partitions, and causal-log streams.

use std::fmt;

/// A monotonic 64-bit epoch identifier. By convention it equals the checkpoint
/// ID that opened the epoch (checkpoint 0 is the implicit first epoch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct EpochId(pub u64);

impl EpochId {
    pub const FIRST: EpochId = EpochId(0);

    pub fn next(self) -> EpochId {
        EpochId(self.0 + 1)
    }
}

impl fmt::Display for EpochId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch-{}", self.0)
    }
}

/// Short numeric identity of a task vertex, as carried on the wire in
/// [`crate::Determinant`]-adjacent protocol events. Distinct from the 16-byte
/// `job_vertex_id` embedded in [`CausalLogId`] — this is the compact routing
/// id used by `DeterminantRequestEvent`/`DeterminantResponseEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct VertexId(pub u16);

/// Index of a producing subtask within its vertex's parallelism.
pub type SubtaskIndex = u16;

/// Index of an input channel within a subtask (at most 256 inputs per task).
pub type ChannelIndex = u8;

/// 16-byte opaque identifier, used for `job_vertex_id` and `partition_id`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Uuid16(pub [u8; 16]);

impl Uuid16 {
    pub const NIL: Uuid16 = Uuid16([0u8; 16]);

    pub fn from_u128(v: u128) -> Self {
        Uuid16(v.to_be_bytes())
    }
}

impl fmt::Debug for Uuid16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Identifier for a per-vertex, per-channel determinant stream.
///
/// Fields are compared in declaration order, which gives `CausalLogId` a
/// total order (needed so the merge step in
/// `causalrt-wire::events::merge_responses` can walk two sorted delta lists).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct CausalLogId {
    pub job_vertex_id: Uuid16,
    pub subtask_index: SubtaskIndex,
    pub channel_index: ChannelIndex,
    pub partition_id: Uuid16,
}

impl CausalLogId {
    pub const WIRE_LEN: usize = 16 + 2 + 1 + 16;

    pub fn to_wire_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        out[0..16].copy_from_slice(&self.job_vertex_id.0);
        out[16..18].copy_from_slice(&self.subtask_index.to_be_bytes());
        out[18] = self.channel_index;
        out[19..35].copy_from_slice(&self.partition_id.0);
        out
    }

    pub fn from_wire_bytes(b: &[u8; Self::WIRE_LEN]) -> Self {
        let mut job_vertex_id = [0u8; 16];
        job_vertex_id.copy_from_slice(&b[0..16]);
        let subtask_index = u16::from_be_bytes([b[16], b[17]]);
        let channel_index = b[18];
        let mut partition_id = [0u8; 16];
        partition_id.copy_from_slice(&b[19..35]);
        CausalLogId {
            job_vertex_id: Uuid16(job_vertex_id),
            subtask_index,
            channel_index,
            partition_id: Uuid16(partition_id),
        }
    }
}

/// Identifier for a `ResultPartition` (the production side of a subpartition).
pub type PartitionId = Uuid16;

/// Task-local identity, used as the `job_vertex_id` component of every
/// `CausalLogId` this task produces.
///
/// The owning task's vertex id resolves to a placeholder `VertexId(0)` until
/// real vertex-identity propagation is wired through the partition parent —
/// see the Open Questions entry in DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskVertexId {
    pub job_vertex_id: Uuid16,
    pub subtask_index: SubtaskIndex,
}

impl TaskVertexId {
    pub fn new(job_vertex_id: Uuid16, subtask_index: SubtaskIndex) -> Self {
        Self { job_vertex_id, subtask_index }
    }

    pub fn causal_log_id(&self, channel_index: ChannelIndex, partition_id: PartitionId) -> CausalLogId {
        CausalLogId {
            job_vertex_id: self.job_vertex_id,
            subtask_index: self.subtask_index,
            channel_index,
            partition_id,
        }
    }

    /// Placeholder vertex id; see DESIGN.md for the real propagation TODO.
    pub fn vertex_id(&self) -> VertexId {
        VertexId(0)
    }
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
