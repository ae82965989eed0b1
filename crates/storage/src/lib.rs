// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! causalrt-storage: in-memory retention for the two logs the recovery core
//! depends on — per-vertex determinants and per-subpartition in-flight
//! buffers. Neither persists to disk; both live only for the span between
//! two acknowledged checkpoints.

pub mod error;
pub mod in_flight_log;
pub mod vertex_causal_log;

pub use error::StorageError;
pub use in_flight_log::{InFlightLog, InFlightLogIter};
pub use vertex_causal_log::{VertexCausalLog, VertexCausalLogStore};
