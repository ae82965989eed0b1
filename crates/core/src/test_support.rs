// SPDX-License-Identifier: MIT

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

/// Proptest strategies for the identifiers in [`crate::ids`], so other
/// crates' property tests don't each hand-roll `Uuid16`/`CausalLogId`
/// generators.
pub mod strategies {
    use proptest::prelude::*;

    use crate::ids::{CausalLogId, ChannelIndex, SubtaskIndex, Uuid16};

    pub fn arb_uuid16() -> impl Strategy<Value = Uuid16> {
        any::<[u8; 16]>().prop_map(Uuid16)
    }

    pub fn arb_causal_log_id() -> impl Strategy<Value = CausalLogId> {
        (arb_uuid16(), any::<SubtaskIndex>(), any::<ChannelIndex>(), arb_uuid16()).prop_map(
            |(job_vertex_id, subtask_index, channel_index, partition_id)| CausalLogId {
                job_vertex_id,
                subtask_index,
                channel_index,
                partition_id,
            },
        )
    }
}
