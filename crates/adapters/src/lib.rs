// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! causalrt-adapters: trait surface for the collaborators the recovery core
//! treats as external — partition lookup, remote connections, task-event
//! transport, checkpoint RPC. No concrete network transport lives here; see
//! `causalrt-runtime::loopback` for the in-process test/demo wiring.

pub mod error;
pub mod traits;

pub use error::AdaptersError;
pub use traits::{
    CheckpointCoordinator, ConnectionManager, ResultPartitionManager, SubpartitionView,
    TaskEventDispatcher,
};

#[cfg(any(test, feature = "test-support"))]
pub use traits::{FakeCheckpointCoordinator, FakeSubpartitionView, FakeTaskEventDispatcher};
