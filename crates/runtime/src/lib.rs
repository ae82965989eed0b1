// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! causalrt-runtime: the task-facing recovery core — epoch tracking, the
//! subpartition output queue and its in-flight log, the consumer-side input
//! channel, the recovery FSM, and an in-process loopback transport for
//! driving it all without a real cluster.

pub mod epoch_tracker;
pub mod error;
pub mod input_channel;
pub mod loopback;
pub mod recovery;
pub mod subpartition;

pub use epoch_tracker::{CheckpointListener, EpochStartListener, EpochTracker};
pub use error::RuntimeError;
pub use input_channel::InputChannel;
pub use loopback::LoopbackTransport;
pub use recovery::{retry_on_partition_not_found, BackoffPolicy, RecoveryManager};
pub use subpartition::{AvailabilityListener, NoopListener, PipelinedSubpartition};
