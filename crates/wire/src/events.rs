// SPDX-License-Identifier: MIT

//! Task-event wire formats exchanged between peers during recovery.
//!
//! All multi-byte integers are big-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use causalrt_core::{CausalLogId, PartitionId, VertexId};

use crate::error::WireError;

/// Broadcast upstream by a recovering task to collect determinants for every
/// vertex on its inbound causal logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminantRequestEvent {
    pub failed_vertex: VertexId,
    pub upstream_correlation_id: u64,
}

/// One upstream peer's contribution to a `CausalLogId`'s determinant stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminantDelta {
    pub log_id: CausalLogId,
    pub payload: Vec<u8>,
}

/// Reply to a `DeterminantRequestEvent`.
///
/// Wire layout:
/// ```text
/// u8   found
/// u16  vertex_id
/// i64  correlation_id
/// u8   num_deltas
/// repeat num_deltas:
///     CausalLogId (fixed-width, see CausalLogId::to_wire_bytes)
///     i32 payload_len
///     u8[payload_len] determinant bytes
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminantResponseEvent {
    pub found: bool,
    pub vertex_id: VertexId,
    pub correlation_id: i64,
    pub deltas: Vec<DeterminantDelta>,
}

/// Protocol maximum for `num_deltas`; a single-byte count can't exceed this,
/// but we also bound it against pathological frames before allocating.
pub const MAX_DELTAS: u8 = u8::MAX;

impl DeterminantResponseEvent {
    pub fn not_found(vertex_id: VertexId, correlation_id: i64) -> Self {
        Self { found: false, vertex_id, correlation_id, deltas: Vec::new() }
    }

    pub fn encode(&self) -> Bytes {
        let mut out = BytesMut::new();
        out.put_u8(self.found as u8);
        out.put_u16(self.vertex_id.0);
        out.put_i64(self.correlation_id);
        out.put_u8(self.deltas.len() as u8);
        for delta in &self.deltas {
            out.put_slice(&delta.log_id.to_wire_bytes());
            out.put_i32(delta.payload.len() as i32);
            out.put_slice(&delta.payload);
        }
        out.freeze()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let mut buf = Bytes::copy_from_slice(bytes);
        if buf.remaining() < 1 {
            return Err(WireError::UnexpectedEof("found"));
        }
        let found = buf.get_u8() != 0;
        if buf.remaining() < 2 {
            return Err(WireError::UnexpectedEof("vertex_id"));
        }
        let vertex_id = VertexId(buf.get_u16());
        if buf.remaining() < 8 {
            return Err(WireError::UnexpectedEof("correlation_id"));
        }
        let correlation_id = buf.get_i64();
        if buf.remaining() < 1 {
            return Err(WireError::UnexpectedEof("num_deltas"));
        }
        let num_deltas = buf.get_u8();
        if num_deltas > MAX_DELTAS {
            return Err(WireError::TooManyDeltas(num_deltas, MAX_DELTAS));
        }

        let mut deltas = Vec::with_capacity(num_deltas as usize);
        for _ in 0..num_deltas {
            if buf.remaining() < CausalLogId::WIRE_LEN {
                return Err(WireError::UnexpectedEof("causal_log_id"));
            }
            let mut id_bytes = [0u8; CausalLogId::WIRE_LEN];
            buf.copy_to_slice(&mut id_bytes);
            let log_id = CausalLogId::from_wire_bytes(&id_bytes);

            if buf.remaining() < 4 {
                return Err(WireError::UnexpectedEof("payload_len"));
            }
            let payload_len = buf.get_i32();
            if payload_len < 0 || payload_len as usize > buf.remaining() {
                return Err(WireError::PayloadTooLong(payload_len.max(0) as u32));
            }
            let payload = buf.copy_to_bytes(payload_len as usize).to_vec();
            deltas.push(DeterminantDelta { log_id, payload });
        }

        if buf.has_remaining() {
            return Err(WireError::TrailingBytes);
        }

        let mut seen = std::collections::BTreeSet::new();
        for delta in &deltas {
            if !seen.insert(delta.log_id) {
                return Err(causalrt_core::CoreError::Invariant(format!(
                    "duplicate causal log id {:?} in determinant response",
                    delta.log_id
                ))
                .into());
            }
        }

        Ok(DeterminantResponseEvent { found, vertex_id, correlation_id, deltas })
    }
}

/// Issued by a recovering downstream subpartition to request replay of an
/// upstream in-flight log. `num_buffers_removed` is how many buffers the
/// downstream side already consumed before the failure; the upstream always
/// replays its full log, and the downstream uses this count to drop that
/// many duplicates client-side (`InputChannel::set_number_buffers_deduplicate`)
/// rather than have the upstream truncate before replaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlightLogRequestEvent {
    pub partition_id: PartitionId,
    pub subpartition_index: u32,
    pub num_buffers_removed: u32,
}

/// Merge two `DeterminantResponseEvent`s collected from different upstream
/// peers observing the same failed vertex.
///
/// - Not-found only if neither side found anything.
/// - For a `CausalLogId` present in both, keep the longer payload (by byte
///   count) under the invariant that one upstream's log is a prefix of the
///   other's — they necessarily observed the same prefix of determinants.
pub fn merge_responses(
    a: DeterminantResponseEvent,
    b: DeterminantResponseEvent,
) -> DeterminantResponseEvent {
    let found = a.found || b.found;
    let vertex_id = if a.found { a.vertex_id } else { b.vertex_id };
    let correlation_id = if a.found { a.correlation_id } else { b.correlation_id };

    let mut by_id: std::collections::BTreeMap<CausalLogId, Vec<u8>> = std::collections::BTreeMap::new();
    for delta in a.deltas.into_iter().chain(b.deltas) {
        by_id
            .entry(delta.log_id)
            .and_modify(|existing| {
                if delta.payload.len() > existing.len() {
                    *existing = delta.payload.clone();
                }
            })
            .or_insert(delta.payload);
    }

    let deltas = by_id
        .into_iter()
        .map(|(log_id, payload)| DeterminantDelta { log_id, payload })
        .collect();

    DeterminantResponseEvent { found, vertex_id, correlation_id, deltas }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
