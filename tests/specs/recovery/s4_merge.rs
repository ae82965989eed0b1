// SPDX-License-Identifier: MIT

//! S4: merge — two upstream peers respond with logs of different lengths for
//! the same causal log id; the merged result keeps the longer payload.

use causalrt_core::{CausalLogId, SubtaskIndex, Uuid16, VertexId};
use causalrt_wire::{merge_responses, DeterminantDelta, DeterminantResponseEvent};

fn log_id() -> CausalLogId {
    CausalLogId {
        job_vertex_id: Uuid16::from_u128(7),
        subtask_index: 0 as SubtaskIndex,
        channel_index: 0,
        partition_id: Uuid16::from_u128(7),
    }
}

#[test]
fn merged_response_keeps_the_longer_payload_and_is_commutative() {
    let id = log_id();
    let short = DeterminantResponseEvent {
        found: true,
        vertex_id: VertexId(1),
        correlation_id: 99,
        deltas: vec![DeterminantDelta { log_id: id, payload: vec![0u8; 100] }],
    };
    let long = DeterminantResponseEvent {
        found: true,
        vertex_id: VertexId(1),
        correlation_id: 99,
        deltas: vec![DeterminantDelta { log_id: id, payload: vec![0u8; 120] }],
    };

    let merged_ab = merge_responses(short.clone(), long.clone());
    assert_eq!(merged_ab.deltas.len(), 1);
    assert_eq!(merged_ab.deltas[0].payload.len(), 120);

    let merged_ba = merge_responses(long, short);
    assert_eq!(merged_ba.deltas[0].payload.len(), 120);
}

#[test]
fn not_found_only_when_neither_side_found_anything() {
    let id = log_id();
    let not_found = DeterminantResponseEvent::not_found(VertexId(2), 1);
    let found = DeterminantResponseEvent {
        found: true,
        vertex_id: VertexId(2),
        correlation_id: 1,
        deltas: vec![DeterminantDelta { log_id: id, payload: vec![1, 2, 3] }],
    };

    let merged = merge_responses(not_found.clone(), found.clone());
    assert!(merged.found);
    assert_eq!(merged.deltas.len(), 1);

    let both_missing = merge_responses(not_found.clone(), not_found);
    assert!(!both_missing.found);
    assert!(both_missing.deltas.is_empty());
}
