// SPDX-License-Identifier: MIT

//! Wire-format errors. Every variant here is a protocol violation: fatal to
//! the recovery attempt in progress, never retried.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("unexpected end of frame while decoding {0}")]
    UnexpectedEof(&'static str),

    #[error("unknown determinant tag {0}")]
    UnknownDeterminantTag(u8),

    #[error("determinant payload length {0} exceeds remaining frame bytes")]
    PayloadTooLong(u32),

    #[error("num_deltas {0} exceeds protocol maximum {1}")]
    TooManyDeltas(u8, u8),

    #[error("trailing bytes after decoding a complete frame")]
    TrailingBytes,

    #[error("data model invariant violated: {0}")]
    Core(#[from] causalrt_core::CoreError),
}
