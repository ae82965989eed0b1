// SPDX-License-Identifier: MIT

//! Segments a task's execution into checkpoint-bounded epochs and assigns
//! each record a monotonic index within its epoch.
//!
//! Not thread-safe by design: callers must hold the task-level checkpoint
//! lock before touching it, and every subscriber callback runs on the
//! calling thread.

use causalrt_core::EpochId;

/// Callback fired synchronously, in subscription order, when a new epoch
/// starts.
pub trait EpochStartListener: Send {
    fn on_epoch_start(&mut self, epoch: EpochId);
}

/// Callback fired when the checkpoint coordinator confirms an epoch is
/// durable.
pub trait CheckpointListener: Send {
    fn on_checkpoint_complete(&mut self, checkpoint_id: EpochId);
}

/// Armed by `set_record_count_target`; fires once `record_count` reaches the
/// target, then disarms itself.
struct RecordCountTarget {
    target: u32,
    on_reached: Box<dyn FnOnce() + Send>,
}

#[derive(Default)]
pub struct EpochTracker {
    current_epoch: EpochId,
    record_count: u32,
    epoch_listeners: Vec<Box<dyn EpochStartListener>>,
    checkpoint_listeners: Vec<Box<dyn CheckpointListener>>,
    record_count_target: Option<RecordCountTarget>,
}

impl EpochTracker {
    pub fn new() -> Self {
        Self {
            current_epoch: EpochId::FIRST,
            record_count: 0,
            epoch_listeners: Vec::new(),
            checkpoint_listeners: Vec::new(),
            record_count_target: None,
        }
    }

    pub fn current_epoch(&self) -> EpochId {
        self.current_epoch
    }

    pub fn record_count(&self) -> u32 {
        self.record_count
    }

    pub fn subscribe_epoch_start(&mut self, listener: Box<dyn EpochStartListener>) {
        self.epoch_listeners.push(listener);
    }

    pub fn subscribe_checkpoint(&mut self, listener: Box<dyn CheckpointListener>) {
        self.checkpoint_listeners.push(listener);
    }

    /// Called after each input record is processed, under the task lock.
    pub fn inc_record_count(&mut self) {
        self.record_count += 1;
        if let Some(target) = &self.record_count_target {
            if self.record_count == target.target {
                let target = self.record_count_target.take().expect("checked Some above");
                (target.on_reached)();
            }
        }
    }

    /// Closes the previous epoch, resets the record count, and notifies
    /// every `EpochStartListener` synchronously in subscription order.
    pub fn start_new_epoch(&mut self, epoch: EpochId) {
        tracing::debug!(%epoch, previous = %self.current_epoch, "starting new epoch");
        self.current_epoch = epoch;
        self.record_count = 0;
        for listener in &mut self.epoch_listeners {
            listener.on_epoch_start(epoch);
        }
    }

    /// Arms a one-shot action for when replay reaches the target record
    /// count; used by `RecoveryManager` to detect the end of determinant
    /// replay.
    pub fn set_record_count_target(&mut self, n: u32, on_reached: Box<dyn FnOnce() + Send>) {
        self.record_count_target = Some(RecordCountTarget { target: n, on_reached });
    }

    /// Forwards to every `CheckpointListener` and authorizes in-flight log
    /// truncation for every epoch at or before `checkpoint_id`.
    pub fn notify_checkpoint_complete(&mut self, checkpoint_id: EpochId) {
        tracing::info!(%checkpoint_id, "checkpoint complete");
        for listener in &mut self.checkpoint_listeners {
            listener.on_checkpoint_complete(checkpoint_id);
        }
    }
}

#[cfg(test)]
#[path = "epoch_tracker_tests.rs"]
mod tests;
