// SPDX-License-Identifier: MIT

//! Collaborator traits for the recovery core's out-of-scope neighbors
//! (task scheduling, network transport, checkpoint RPC). The core is
//! generic over these rather than depending on concrete types, the way the
//! job runtime threads `SessionAdapter`/`AgentAdapter`/`NotifyAdapter`
//! through its executor.

use async_trait::async_trait;
use causalrt_core::{BufferAndBacklog, EpochId, PartitionId};

use crate::error::AdaptersError;

/// A consumer-visible handle on a subpartition's output, returned by
/// `ResultPartitionManager::create_subpartition_view`.
pub trait SubpartitionView: Send + Sync {
    /// Non-blocking poll; `None` if nothing is currently available.
    fn poll_buffer(&self) -> Option<BufferAndBacklog>;

    /// Ask the owning subpartition to replay its in-flight log from the top.
    fn request_replay(&self);

    fn is_released(&self) -> bool;
}

/// Creates subpartition views, the production-side counterpart of an input
/// channel's `request_subpartition`.
#[async_trait]
pub trait ResultPartitionManager: Send + Sync + 'static {
    async fn create_subpartition_view(
        &self,
        partition_id: PartitionId,
        subpartition_index: u32,
    ) -> Result<std::sync::Arc<dyn SubpartitionView>, AdaptersError>;
}

/// Establishes remote input channels to a peer task manager. Local channels
/// never go through this trait.
#[async_trait]
pub trait ConnectionManager: Send + Sync + 'static {
    async fn create_remote_channel(
        &self,
        partition_id: PartitionId,
        subpartition_index: u32,
    ) -> Result<(), AdaptersError>;
}

/// Publishes a task event (determinant request/response, in-flight log
/// request) on the same transport as data buffers, preserving FIFO order
/// relative to them.
#[async_trait]
pub trait TaskEventDispatcher: Send + Sync + 'static {
    async fn publish(&self, partition_id: PartitionId, event: Vec<u8>) -> Result<bool, AdaptersError>;
}

/// Callback surface the checkpoint coordinator drives; implementations
/// forward into `EpochTracker::notify_checkpoint_complete` and the vertex
/// causal log store's truncation.
pub trait CheckpointCoordinator: Send + Sync + 'static {
    fn notify_checkpoint_complete(&self, checkpoint_id: EpochId);
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{AdaptersError, CheckpointCoordinator, SubpartitionView, TaskEventDispatcher};
    use async_trait::async_trait;
    use causalrt_core::{BufferAndBacklog, EpochId, PartitionId};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// A `SubpartitionView` over a fixed, pre-seeded sequence of dispatches.
    /// Tests exhaust it front-to-back; `request_replay` is recorded but does
    /// not refill the queue.
    #[derive(Default)]
    pub struct FakeSubpartitionView {
        queue: Mutex<std::collections::VecDeque<BufferAndBacklog>>,
        replay_requests: Mutex<u32>,
        released: Mutex<bool>,
    }

    impl FakeSubpartitionView {
        pub fn new(dispatches: Vec<BufferAndBacklog>) -> Self {
            Self {
                queue: Mutex::new(dispatches.into()),
                replay_requests: Mutex::new(0),
                released: Mutex::new(false),
            }
        }

        pub fn replay_request_count(&self) -> u32 {
            *self.replay_requests.lock()
        }

        pub fn mark_released(&self) {
            *self.released.lock() = true;
        }
    }

    impl SubpartitionView for FakeSubpartitionView {
        fn poll_buffer(&self) -> Option<BufferAndBacklog> {
            self.queue.lock().pop_front()
        }

        fn request_replay(&self) {
            *self.replay_requests.lock() += 1;
        }

        fn is_released(&self) -> bool {
            *self.released.lock()
        }
    }

    /// Recorded task-event dispatcher: every `publish` call succeeds and is
    /// retained in order for assertions.
    #[derive(Default)]
    pub struct FakeTaskEventDispatcher {
        published: Mutex<Vec<(PartitionId, Vec<u8>)>>,
    }

    impl FakeTaskEventDispatcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn published(&self) -> Vec<(PartitionId, Vec<u8>)> {
            self.published.lock().clone()
        }
    }

    #[async_trait]
    impl TaskEventDispatcher for FakeTaskEventDispatcher {
        async fn publish(
            &self,
            partition_id: PartitionId,
            event: Vec<u8>,
        ) -> Result<bool, AdaptersError> {
            self.published.lock().push((partition_id, event));
            Ok(true)
        }
    }

    /// Records every checkpoint notification it receives, in order.
    #[derive(Default)]
    pub struct FakeCheckpointCoordinator {
        notified: Arc<Mutex<Vec<EpochId>>>,
    }

    impl FakeCheckpointCoordinator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn notified(&self) -> Vec<EpochId> {
            self.notified.lock().clone()
        }
    }

    impl CheckpointCoordinator for FakeCheckpointCoordinator {
        fn notify_checkpoint_complete(&self, checkpoint_id: EpochId) {
            self.notified.lock().push(checkpoint_id);
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeCheckpointCoordinator, FakeSubpartitionView, FakeTaskEventDispatcher};

#[cfg(test)]
#[path = "traits_tests.rs"]
mod tests;
