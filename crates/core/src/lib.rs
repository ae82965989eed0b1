// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! causalrt-core: data model for the causal recovery core — identifiers,
//! buffers, and the determinant vocabulary shared by every other crate in
//! this workspace.

pub mod buffer;
pub mod determinant;
pub mod error;
pub mod ids;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use buffer::{Buffer, BufferAndBacklog, BufferConsumer};
pub use determinant::{Determinant, TimerId};
pub use error::CoreError;
pub use ids::{
    CausalLogId, ChannelIndex, EpochId, PartitionId, SubtaskIndex, TaskVertexId, Uuid16, VertexId,
};
