// SPDX-License-Identifier: MIT

//! In-process loopback transport: wires a `PipelinedSubpartition` directly to
//! whatever asks for it via `ResultPartitionManager`, with no network.
//!
//! This is explicitly a test/demo harness for driving end-to-end scenarios
//! without a real cluster — production transport is out of scope here. It
//! lives in this crate rather than in `causalrt-adapters` because it needs
//! the concrete `PipelinedSubpartition` type, and `causalrt-adapters` only
//! defines trait surfaces to avoid a dependency cycle between the two
//! crates.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use causalrt_adapters::{AdaptersError, ResultPartitionManager, SubpartitionView, TaskEventDispatcher};
use causalrt_core::{BufferAndBacklog, PartitionId};
use parking_lot::Mutex;

use crate::subpartition::PipelinedSubpartition;

struct SubpartitionViewAdapter(Arc<PipelinedSubpartition>);

impl SubpartitionView for SubpartitionViewAdapter {
    fn poll_buffer(&self) -> Option<BufferAndBacklog> {
        self.0.poll_buffer()
    }

    fn request_replay(&self) {
        self.0.request_replay();
    }

    fn is_released(&self) -> bool {
        self.0.is_released()
    }
}

/// An in-process registry of `(PartitionId, subpartition_index) ->
/// PipelinedSubpartition`, doubling as both `ResultPartitionManager` and
/// `TaskEventDispatcher` for a loopback wiring where producer and consumer
/// share a process.
#[derive(Default)]
pub struct LoopbackTransport {
    partitions: Mutex<BTreeMap<(PartitionId, u32), Arc<PipelinedSubpartition>>>,
    published: Mutex<Vec<(PartitionId, Vec<u8>)>>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        partition_id: PartitionId,
        subpartition_index: u32,
        subpartition: Arc<PipelinedSubpartition>,
    ) {
        self.partitions.lock().insert((partition_id, subpartition_index), subpartition);
    }

    /// Every task event published through this transport, in order; useful
    /// for demo/test assertions that a determinant request actually went out.
    pub fn published_events(&self) -> Vec<(PartitionId, Vec<u8>)> {
        self.published.lock().clone()
    }
}

#[async_trait]
impl ResultPartitionManager for LoopbackTransport {
    async fn create_subpartition_view(
        &self,
        partition_id: PartitionId,
        subpartition_index: u32,
    ) -> Result<Arc<dyn SubpartitionView>, AdaptersError> {
        match self.partitions.lock().get(&(partition_id, subpartition_index)) {
            Some(sub) => Ok(Arc::new(SubpartitionViewAdapter(sub.clone()))),
            None => {
                tracing::debug!(?partition_id, subpartition_index, "loopback partition not registered");
                Err(AdaptersError::PartitionNotFound(partition_id, subpartition_index))
            }
        }
    }
}

#[async_trait]
impl TaskEventDispatcher for LoopbackTransport {
    async fn publish(&self, partition_id: PartitionId, event: Vec<u8>) -> Result<bool, AdaptersError> {
        self.published.lock().push((partition_id, event));
        Ok(true)
    }
}

#[cfg(test)]
#[path = "loopback_tests.rs"]
mod tests;
