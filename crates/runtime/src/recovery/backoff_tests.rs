// SPDX-License-Identifier: MIT

use super::*;
use causalrt_core::Uuid16;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

fn policy() -> BackoffPolicy {
    BackoffPolicy::new(Duration::from_millis(10), Duration::from_millis(40))
}

// S5: retries at 10, 20, 40ms then surfaces PartitionNotFound.
#[tokio::test(start_paused = true)]
async fn gives_up_after_exhausting_backoff_window() {
    let attempts = AtomicU32::new(0);
    let start = tokio::time::Instant::now();

    let result = retry_on_partition_not_found(policy(), || {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Err(AdaptersError::PartitionNotFound(Uuid16::NIL, 0)) }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert_eq!(tokio::time::Instant::now() - start, Duration::from_millis(70));
}

#[tokio::test(start_paused = true)]
async fn succeeds_immediately_without_waiting() {
    let attempts = AtomicU32::new(0);
    let result: Result<u32, RuntimeError> = retry_on_partition_not_found(policy(), || {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Ok(7) }
    })
    .await;
    assert_eq!(result.unwrap(), 7);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn succeeds_on_a_later_retry_without_exhausting_backoff() {
    let attempts = AtomicU32::new(0);
    let result = retry_on_partition_not_found(policy(), || {
        let n = attempts.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < 2 {
                Err(AdaptersError::PartitionNotFound(Uuid16::NIL, 0))
            } else {
                Ok(n)
            }
        }
    })
    .await;
    assert_eq!(result.unwrap(), 2);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn non_partition_not_found_errors_are_not_retried() {
    let attempts = AtomicU32::new(0);
    let result: Result<u32, RuntimeError> = retry_on_partition_not_found(policy(), || {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Err(AdaptersError::ConnectionFailed(Uuid16::NIL, "refused".into())) }
    })
    .await;
    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
