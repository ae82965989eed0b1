// SPDX-License-Identifier: MIT

//! Shared error type for invariant violations raised at the data-model layer.

use thiserror::Error;

/// A broken invariant that must not be continued past silently. Logic
/// invariants are fatal assertions, not recoverable conditions — callers are
/// expected to propagate this and fail the task rather than retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invariant violated: {0}")]
    Invariant(String),
}
