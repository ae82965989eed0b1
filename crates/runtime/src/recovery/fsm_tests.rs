// SPDX-License-Identifier: MIT

use super::*;
use causalrt_core::Uuid16;
use causalrt_wire::DeterminantDelta;

fn log_id(subtask: u16) -> causalrt_core::CausalLogId {
    causalrt_core::CausalLogId {
        job_vertex_id: Uuid16::from_u128(1),
        subtask_index: subtask,
        channel_index: 0,
        partition_id: Uuid16::from_u128(2),
    }
}

#[test]
fn full_recovery_walks_every_state_in_order() {
    let manager = RecoveryManager::new(2, 2);
    let partition_id = Uuid16::from_u128(42);
    let subpartition = Arc::new(PipelinedSubpartition::new());
    manager.register_subpartition(partition_id, 0, subpartition.clone()).unwrap();

    manager.notify_start_recovery(VertexId(7)).unwrap();

    assert!(manager.notify_new_input_channel(0, 0).is_none());
    let request = manager.notify_new_input_channel(1, 0).unwrap();
    assert_eq!(request.failed_vertex, VertexId(7));

    let resp_a = DeterminantResponseEvent {
        found: true,
        vertex_id: VertexId(7),
        correlation_id: request.upstream_correlation_id as i64,
        deltas: vec![DeterminantDelta { log_id: log_id(0), payload: vec![1, 2, 3] }],
    };
    let resp_b = DeterminantResponseEvent {
        found: true,
        vertex_id: VertexId(7),
        correlation_id: request.upstream_correlation_id as i64,
        deltas: vec![DeterminantDelta { log_id: log_id(0), payload: vec![1, 2, 3, 4, 5] }],
    };

    assert!(manager.notify_determinant_response(resp_a).is_none());
    let merged = manager.notify_determinant_response(resp_b).unwrap();
    assert_eq!(merged.deltas.len(), 1);
    assert_eq!(merged.deltas[0].payload.len(), 5);

    // Queue an in-flight log request for a subpartition still recovering.
    subpartition.set_recovering_in_flight_state(true);
    manager.notify_in_flight_log_request(InFlightLogRequestEvent {
        partition_id,
        subpartition_index: 0,
        num_buffers_removed: 2,
    });
    assert_eq!(subpartition.in_flight_log_len(), 0);

    manager.set_record_count_target(3);
    manager.notify_replay_progress(2);
    assert!(!manager.state_is_running());

    subpartition.set_recovering_in_flight_state(false);
    manager.notify_replay_progress(1);
    assert!(manager.state_is_running());
}

#[test]
fn start_recovery_twice_is_rejected() {
    let manager = RecoveryManager::new(1, 1);
    manager.notify_start_recovery(VertexId(1)).unwrap();
    assert!(manager.notify_start_recovery(VertexId(1)).is_err());
}

#[test]
fn register_subpartition_rejects_an_already_released_one() {
    let manager = RecoveryManager::new(1, 1);
    let partition_id = Uuid16::from_u128(11);
    let subpartition = Arc::new(PipelinedSubpartition::new());
    subpartition.release();

    let err = manager.register_subpartition(partition_id, 0, subpartition).unwrap_err();
    assert!(matches!(err, RuntimeError::Storage(_)));
}

#[test]
fn in_flight_log_request_replays_immediately_when_not_recovering() {
    let manager = RecoveryManager::new(1, 1);
    let partition_id = Uuid16::from_u128(9);
    let subpartition = Arc::new(PipelinedSubpartition::new());
    subpartition.set_current_epoch(EpochId(0));
    let consumer = causalrt_core::BufferConsumer::new_payload();
    consumer.write(b"x");
    consumer.finish();
    subpartition.add(consumer, false);
    subpartition.poll_buffer();
    assert_eq!(subpartition.in_flight_log_len(), 1);

    manager.register_subpartition(partition_id, 0, subpartition.clone()).unwrap();
    manager.notify_in_flight_log_request(InFlightLogRequestEvent {
        partition_id,
        subpartition_index: 0,
        num_buffers_removed: 1,
    });

    // The full log replays — the upstream never truncates on this count;
    // dedup of the already-consumed prefix is the downstream's job.
    assert_eq!(subpartition.in_flight_log_len(), 1);
    let replayed = subpartition.poll_buffer().unwrap();
    assert_eq!(replayed.buffer.data(), b"x");
}

#[test]
fn determinant_response_outside_waiting_determinants_is_dropped() {
    let manager = RecoveryManager::new(1, 1);
    let resp = DeterminantResponseEvent::not_found(VertexId(1), 1);
    assert!(manager.notify_determinant_response(resp).is_none());
}
