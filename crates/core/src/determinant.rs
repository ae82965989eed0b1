// SPDX-License-Identifier: MIT

//! Recorded nondeterministic choices, replayed during recovery.

use crate::ids::ChannelIndex;

/// Opaque timer identity, scoped to the owning task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// A single recorded nondeterministic choice.
///
/// Appended to a [`crate::CausalLogId`]'s segment in the exact order the
/// operator made the choice while processing records within an epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Determinant {
    /// Which input channel was selected to read the next record from.
    OrderDeterminant { channel_index: ChannelIndex },
    /// A timer fired.
    TimerDeterminant { timer_id: TimerId },
    /// A random draw, recorded so replay can reproduce it without re-seeding.
    RngDeterminant { value: u64 },
    /// Operator-defined nondeterminism that doesn't fit the other tags.
    SerializableDeterminant { payload: Vec<u8> },
}

impl Determinant {
    /// Tag byte used by `causalrt-wire::DeterminantEncoder`.
    pub fn tag(&self) -> u8 {
        match self {
            Determinant::OrderDeterminant { .. } => 0,
            Determinant::TimerDeterminant { .. } => 1,
            Determinant::RngDeterminant { .. } => 2,
            Determinant::SerializableDeterminant { .. } => 3,
        }
    }
}

#[cfg(test)]
#[path = "determinant_tests.rs"]
mod tests;
