// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdaptersError {
    #[error("partition not found: {0:?} subpartition {1}")]
    PartitionNotFound(causalrt_core::PartitionId, u32),

    #[error("connection to peer for partition {0:?} failed: {1}")]
    ConnectionFailed(causalrt_core::PartitionId, String),

    #[error("io error publishing task event: {0}")]
    Io(String),
}
