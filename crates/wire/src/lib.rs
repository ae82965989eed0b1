// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! causalrt-wire: binary wire formats for determinant logs and the
//! recovery-time task events built on top of them.

pub mod encoder;
pub mod error;
pub mod events;

pub use encoder::DeterminantEncoder;
pub use error::WireError;
pub use events::{
    merge_responses, DeterminantDelta, DeterminantRequestEvent, DeterminantResponseEvent,
    InFlightLogRequestEvent, MAX_DELTAS,
};
