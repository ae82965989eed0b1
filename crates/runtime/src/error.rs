// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Error taxonomy for the recovery core. Transient network conditions are
/// retried with bounded backoff by the caller; everything else here is
/// either a terminal signal (subpartition released, downstream failed) or a
/// logic-invariant violation that must not be silently absorbed.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("partition not found after exhausting backoff")]
    PartitionNotFound(#[from] causalrt_adapters::AdaptersError),

    #[error("subpartition released while reading")]
    SubpartitionReleased,

    #[error("downstream failed")]
    DownstreamFailed,

    #[error("wire protocol violation: {0}")]
    Protocol(#[from] causalrt_wire::WireError),

    #[error("storage layer error: {0}")]
    Storage(#[from] causalrt_storage::StorageError),

    #[error("invariant violated: {0}")]
    Invariant(String),
}
