// SPDX-License-Identifier: MIT

//! Consumer side of a subpartition: `LocalInputChannel` / `RemoteInputChannel`.
//!
//! Both channel kinds share the same dedup/identity-mutation surface; the
//! local/remote split only changes how `subpartition_view` is established —
//! in-process via `ResultPartitionManager` for local, via `ConnectionManager`
//! for remote. `request_lock` (here, the channel's own `parking_lot::Mutex`)
//! guards the lazy establishment of that view, per the concurrency model.

use std::sync::Arc;

use causalrt_adapters::{ConnectionManager, ResultPartitionManager, SubpartitionView};
use causalrt_core::{BufferAndBacklog, ChannelIndex, PartitionId};
use parking_lot::Mutex;

use crate::error::RuntimeError;

struct State {
    view: Option<Arc<dyn SubpartitionView>>,
    released: bool,
    deduplicating: bool,
    buffers_to_dedupe: u32,
    buffers_removed: u32,
}

/// Which side establishes the underlying `SubpartitionView`.
enum Origin {
    Local { manager: Arc<dyn ResultPartitionManager> },
    Remote { manager: Arc<dyn ConnectionManager> },
}

/// A task's input side for one subpartition index. The index is stable across
/// `to_new_local`/`to_new_remote` identity mutation; only the underlying view
/// and origin change.
pub struct InputChannel {
    partition_id: PartitionId,
    subpartition_index: u32,
    channel_index: ChannelIndex,
    origin: Origin,
    state: Mutex<State>,
}

impl InputChannel {
    fn new(
        partition_id: PartitionId,
        subpartition_index: u32,
        channel_index: ChannelIndex,
        origin: Origin,
    ) -> Self {
        Self {
            partition_id,
            subpartition_index,
            channel_index,
            origin,
            state: Mutex::new(State {
                view: None,
                released: false,
                deduplicating: false,
                buffers_to_dedupe: 0,
                buffers_removed: 0,
            }),
        }
    }

    pub fn new_local(
        partition_id: PartitionId,
        subpartition_index: u32,
        channel_index: ChannelIndex,
        manager: Arc<dyn ResultPartitionManager>,
    ) -> Self {
        Self::new(partition_id, subpartition_index, channel_index, Origin::Local { manager })
    }

    pub fn new_remote(
        partition_id: PartitionId,
        subpartition_index: u32,
        channel_index: ChannelIndex,
        manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self::new(partition_id, subpartition_index, channel_index, Origin::Remote { manager })
    }

    pub fn channel_index(&self) -> ChannelIndex {
        self.channel_index
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }

    /// Lazily establishes `subpartition_view` under `request_lock`, retrying
    /// nothing itself — `RecoveryManager` owns the backoff/retrigger policy
    /// for `PartitionNotFound`.
    ///
    /// A remote channel only establishes the connection here; the concrete
    /// transport that eventually feeds it buffers is out of scope for this
    /// crate, so `get_next_buffer` on a remote channel with no local view
    /// always observes empty until a real transport is wired in.
    pub async fn request_subpartition(&self) -> Result<(), RuntimeError> {
        {
            let state = self.state.lock();
            if state.view.is_some() || state.released {
                return Ok(());
            }
        }
        let view = match &self.origin {
            Origin::Local { manager } => Some(
                manager
                    .create_subpartition_view(self.partition_id, self.subpartition_index)
                    .await?,
            ),
            Origin::Remote { manager } => {
                manager
                    .create_remote_channel(self.partition_id, self.subpartition_index)
                    .await?;
                None
            }
        };
        let mut state = self.state.lock();
        if state.released {
            return Ok(());
        }
        state.view = view;
        Ok(())
    }

    /// Non-blocking poll for the next buffer, honoring dedup and the release
    /// flag. `checkAndWaitForSubpartitionView`'s blocking suspension point is
    /// not modeled here — callers poll from an async context and yield
    /// themselves between attempts.
    pub fn get_next_buffer(&self) -> Result<Option<BufferAndBacklog>, RuntimeError> {
        let mut state = self.state.lock();
        if state.released {
            return Ok(None);
        }
        let view = match state.view.clone() {
            Some(view) => view,
            None => return Ok(None),
        };
        if view.is_released() {
            state.released = true;
            return Ok(None);
        }

        loop {
            let Some(dispatched) = view.poll_buffer() else {
                return Ok(None);
            };
            if state.deduplicating {
                tracing::trace!(
                    remaining = state.buffers_to_dedupe,
                    "dropping duplicate buffer during replay dedup"
                );
                state.buffers_to_dedupe = state.buffers_to_dedupe.saturating_sub(1);
                if state.buffers_to_dedupe == 0 {
                    state.deduplicating = false;
                }
                continue;
            }
            state.buffers_removed += 1;
            return Ok(Some(dispatched));
        }
    }

    pub fn request_replay(&self) {
        if let Some(view) = self.state.lock().view.clone() {
            view.request_replay();
        }
    }

    /// Idempotent; sets `is_released` before touching the underlying view so
    /// a concurrent `get_next_buffer` observes it and returns empty.
    pub fn release_all_resources(&self) {
        let mut state = self.state.lock();
        if state.released {
            return;
        }
        state.released = true;
        state.view = None;
    }

    /// Releases this channel and returns a fresh one at the same
    /// `(partition_id, subpartition_index, channel_index)`, now local. Used
    /// when a peer's output relocates onto this task manager. Credit-based
    /// buffer-segment reassignment does not apply here — this crate has no
    /// credit-based buffer pool to reassign segments from.
    pub fn to_new_local(self, manager: Arc<dyn ResultPartitionManager>) -> Self {
        self.release_all_resources();
        Self::new_local(self.partition_id, self.subpartition_index, self.channel_index, manager)
    }

    /// Releases this channel and returns a fresh one at the same
    /// `(partition_id, subpartition_index, channel_index)`, now remote. Used
    /// when a peer's output relocates off this task manager.
    pub fn to_new_remote(self, manager: Arc<dyn ConnectionManager>) -> Self {
        self.release_all_resources();
        Self::new_remote(self.partition_id, self.subpartition_index, self.channel_index, manager)
    }

    pub fn set_number_buffers_deduplicate(&self, n: u32) {
        self.state.lock().buffers_to_dedupe = n;
    }

    pub fn set_deduplicating(&self) {
        let mut state = self.state.lock();
        state.deduplicating = state.buffers_to_dedupe > 0;
    }

    /// Returns and zeroes the count of buffers delivered since the last call;
    /// used by upstream to bound its in-flight log truncation request.
    pub fn get_reset_number_buffers_removed(&self) -> u32 {
        let mut state = self.state.lock();
        std::mem::take(&mut state.buffers_removed)
    }

    /// Publishes a task event (determinant request, in-flight log request)
    /// on the same transport as data buffers via the dispatcher supplied by
    /// the caller; this channel has no opinion on transport identity.
    pub async fn send_task_event(
        &self,
        dispatcher: &dyn causalrt_adapters::TaskEventDispatcher,
        event: Vec<u8>,
    ) -> Result<bool, RuntimeError> {
        Ok(dispatcher.publish(self.partition_id, event).await?)
    }
}

#[cfg(test)]
#[path = "input_channel_tests.rs"]
mod tests;
