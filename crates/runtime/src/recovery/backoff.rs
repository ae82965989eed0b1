// SPDX-License-Identifier: MIT

//! Exponential backoff for `request_subpartition` retries on
//! `PartitionNotFound`.
//!
//! Retriggering is a timer that re-enters the attempt; tests drive it with
//! `tokio::time::pause`/`advance` since the retry loop itself is the thing
//! under test, not arbitrary wall-clock reads.

use std::time::Duration;

use causalrt_adapters::AdaptersError;

use crate::error::RuntimeError;

/// `initial_backoff`/`max_backoff` pair governing `PartitionNotFound` retry.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl BackoffPolicy {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max }
    }

    /// The wait durations between attempts: `initial`, doubling, up to and
    /// including `max` exactly once. E.g. `initial=10ms, max=40ms` yields
    /// `[10ms, 20ms, 40ms]` — three retries after the first attempt, four
    /// attempts total before giving up.
    fn waits(&self) -> Vec<Duration> {
        let mut waits = Vec::new();
        let mut wait = self.initial;
        loop {
            waits.push(wait);
            if wait >= self.max {
                break;
            }
            wait = (wait * 2).min(self.max);
        }
        waits
    }
}

/// Retries `attempt` on `AdaptersError::PartitionNotFound`, waiting
/// `policy.initial`, then doubling up to `policy.max` between each retry.
/// After the retry at `policy.max` itself still fails, the error is
/// surfaced as terminal. Any other error is surfaced immediately.
pub async fn retry_on_partition_not_found<F, Fut, T>(
    policy: BackoffPolicy,
    mut attempt: F,
) -> Result<T, RuntimeError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AdaptersError>>,
{
    let mut last_err = match attempt().await {
        Ok(value) => return Ok(value),
        Err(err @ AdaptersError::PartitionNotFound(..)) => err,
        Err(other) => return Err(RuntimeError::from(other)),
    };

    for wait in policy.waits() {
        tracing::debug!(?wait, "partition not found, backing off");
        tokio::time::sleep(wait).await;
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err @ AdaptersError::PartitionNotFound(..)) => last_err = err,
            Err(other) => return Err(RuntimeError::from(other)),
        }
    }
    tracing::warn!("partition still missing past max backoff, giving up");
    Err(RuntimeError::from(last_err))
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
