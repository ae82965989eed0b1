// SPDX-License-Identifier: MIT

//! `RuntimeConfig`: loaded from a TOML file via `serde(default)` fallbacks.
//! Absence of a config file is not an error — every field has a default
//! matching the one used in tests.

use std::path::Path;

use serde::Deserialize;

use crate::error::DaemonError;

fn default_initial_backoff_ms() -> u64 {
    10
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_checkpoint_ack_timeout_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub in_flight_log_soft_cap: Option<usize>,
    pub checkpoint_ack_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            in_flight_log_soft_cap: None,
            checkpoint_ack_timeout_ms: default_checkpoint_ack_timeout_ms(),
        }
    }
}

impl RuntimeConfig {
    /// Loads from `path`, falling back to defaults if the file does not
    /// exist. A present-but-malformed file is a hard error.
    pub fn load(path: &Path) -> Result<Self, DaemonError> {
        if !path.exists() {
            tracing::info!(?path, "no runtime config file found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DaemonError::Config(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|e| DaemonError::Config(format!("parsing {}: {e}", path.display())))
    }

    pub fn backoff_policy(&self) -> causalrt_runtime::BackoffPolicy {
        causalrt_runtime::BackoffPolicy::new(
            std::time::Duration::from_millis(self.initial_backoff_ms),
            std::time::Duration::from_millis(self.max_backoff_ms),
        )
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
