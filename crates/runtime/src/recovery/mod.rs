// SPDX-License-Identifier: MIT

//! Recovery: the `RecoveryManager` FSM and the backoff policy governing
//! `request_subpartition` retries on `PartitionNotFound`.

mod backoff;
mod fsm;

pub use backoff::{retry_on_partition_not_found, BackoffPolicy};
pub use fsm::RecoveryManager;
