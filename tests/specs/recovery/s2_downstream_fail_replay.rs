// SPDX-License-Identifier: MIT

//! S2: downstream fail + replay — buffers appended while downstream has
//! failed drain straight into the in-flight log with no dispatch; once
//! replay is requested, they come back out in order, and subsequent appends
//! resume normal dispatch.

use std::sync::Arc;

use causalrt_core::{BufferConsumer, EpochId};
use causalrt_runtime::PipelinedSubpartition;

fn finished(bytes: &[u8]) -> BufferConsumer {
    let consumer = BufferConsumer::new_payload();
    consumer.write(bytes);
    consumer.finish();
    consumer
}

#[test]
fn fail_then_replay_then_resume_normal_dispatch() {
    let sub = Arc::new(PipelinedSubpartition::new());
    sub.set_current_epoch(EpochId::FIRST);

    assert!(sub.add(finished(b"b1"), false));
    assert!(sub.add(finished(b"b2"), false));
    assert_eq!(sub.poll_buffer().unwrap().buffer.data(), b"b1");
    assert_eq!(sub.poll_buffer().unwrap().buffer.data(), b"b2");

    sub.send_fail_consumer_trigger("peer unreachable");
    assert!(sub.is_downstream_failed());

    assert!(sub.add(finished(b"b3"), false));
    assert!(sub.add(finished(b"b4"), false));
    assert!(sub.poll_buffer().is_none(), "downstream-failed subpartitions do not dispatch");

    sub.request_replay();
    assert!(!sub.is_downstream_failed());

    let mut replayed = Vec::new();
    while let Some(d) = sub.poll_buffer() {
        replayed.push(d.buffer.data().to_vec());
    }
    assert_eq!(
        replayed,
        vec![b"b1".to_vec(), b"b2".to_vec(), b"b3".to_vec(), b"b4".to_vec()]
    );

    assert!(sub.add(finished(b"b5"), false));
    assert_eq!(sub.poll_buffer().unwrap().buffer.data(), b"b5");
}
