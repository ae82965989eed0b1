// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("in-flight log is closed")]
    LogClosed,

    #[error("invariant violated: {0}")]
    Invariant(String),
}
