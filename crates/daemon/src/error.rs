// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Runtime(#[from] causalrt_runtime::RuntimeError),
}
