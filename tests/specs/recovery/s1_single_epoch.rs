// SPDX-License-Identifier: MIT

//! S1: single epoch, no failure — 3 records dispatched and logged, then the
//! in-flight log drains to zero on checkpoint acknowledgement.

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
fn three_records_dispatch_and_log_then_truncate_on_checkpoint() {
    let sub = Arc::new(PipelinedSubpartition::new());
    sub.set_current_epoch(EpochId::FIRST);

    for record in [b"r1".as_slice(), b"r2".as_slice(), b"r3".as_slice()] {
        assert!(sub.add(finished(record), false));
    }

    let mut dispatched = Vec::new();
    while let Some(d) = sub.poll_buffer() {
        dispatched.push(d.buffer.data().to_vec());
    }
    assert_eq!(dispatched, vec![b"r1".to_vec(), b"r2".to_vec(), b"r3".to_vec()]);
    assert_eq!(sub.in_flight_log_len(), 3);

    sub.notify_downstream_checkpoint_complete(3);
    assert_eq!(sub.in_flight_log_len(), 0);
}
