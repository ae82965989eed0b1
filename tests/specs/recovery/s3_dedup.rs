// SPDX-License-Identifier: MIT

//! S3: dedup — a consumer that already processed 2 of 4 replayed buffers
//! before its upstream failed must drop exactly those 2 on reconnect and
//! deliver only the remaining suffix.

use std::sync::Arc;

use causalrt_core::{EpochId, Uuid16};
use causalrt_runtime::{InputChannel, LoopbackTransport, PipelinedSubpartition};

fn finished(bytes: &[u8]) -> causalrt_core::BufferConsumer {
    let consumer = causalrt_core::BufferConsumer::new_payload();
    consumer.write(bytes);
    consumer.finish();
    consumer
}

#[tokio::test]
async fn dedup_drops_already_processed_prefix_on_replay() {
    let transport = Arc::new(LoopbackTransport::new());
    let partition_id = Uuid16::from_u128(42);
    let sub = Arc::new(PipelinedSubpartition::new());
    sub.set_current_epoch(EpochId::FIRST);
    transport.register(partition_id, 0, sub.clone());

    for record in [b"b1".as_slice(), b"b2", b"b3", b"b4"] {
        sub.add(finished(record), false);
    }
    sub.send_fail_consumer_trigger("peer unreachable");
    sub.request_replay();

    let channel = InputChannel::new_local(partition_id, 0, 0, transport.clone());
    channel.request_subpartition().await.unwrap();
    channel.set_number_buffers_deduplicate(2);
    channel.set_deduplicating();

    let mut delivered = Vec::new();
    while let Some(d) = channel.get_next_buffer().unwrap() {
        delivered.push(d.buffer.data().to_vec());
        if !d.more_available {
            break;
        }
    }

    assert_eq!(delivered, vec![b"b3".to_vec(), b"b4".to_vec()]);
    assert_eq!(channel.get_reset_number_buffers_removed(), 2);
}
