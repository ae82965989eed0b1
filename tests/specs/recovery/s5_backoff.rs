// SPDX-License-Identifier: MIT

//! S5: backoff — `request_subpartition` against a partition that never
//! registers retries at 10, 20, 40ms (initial=10ms, max=40ms) then surfaces
//! `PartitionNotFound`, driven end-to-end through the loopback transport
//! rather than a synthetic attempt closure.

use std::sync::Arc;
use std::time::Duration;

use causalrt_core::Uuid16;
use causalrt_runtime::{retry_on_partition_not_found, BackoffPolicy, InputChannel, LoopbackTransport};

#[tokio::test(start_paused = true)]
async fn missing_loopback_partition_retries_then_gives_up() {
    let transport = Arc::new(LoopbackTransport::new());
    let channel = InputChannel::new_local(Uuid16::from_u128(404), 0, 0, transport);
    let policy = BackoffPolicy::new(Duration::from_millis(10), Duration::from_millis(40));
    let start = tokio::time::Instant::now();

    let result = retry_on_partition_not_found(policy, || async {
        match channel.request_subpartition().await {
            Ok(()) => Ok(()),
            Err(causalrt_runtime::RuntimeError::PartitionNotFound(inner)) => Err(inner),
            Err(_) => unreachable!("loopback local channels only fail with PartitionNotFound"),
        }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(tokio::time::Instant::now() - start, Duration::from_millis(70));
}
