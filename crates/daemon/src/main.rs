// SPDX-License-Identifier: MIT

//! causalrtd — demo/integration host for the recovery runtime.
//!
//! No production network transport exists yet (out of scope, see
//! `causalrt_runtime::loopback`); this binary wires an in-process
//! `LoopbackTransport` and drives a couple of registered subpartitions so the
//! whole stack — subpartition queue, input channel, recovery FSM — can be
//! exercised end-to-end from a single process.

mod config;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use causalrt_core::{EpochId, PartitionId, Uuid16};
use causalrt_runtime::{InputChannel, LoopbackTransport, PipelinedSubpartition};
use error::DaemonError;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,causalrt_runtime=debug".into()),
        )
        .init();

    if let Err(err) = run().await {
        tracing::error!(%err, "causalrtd exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), DaemonError> {
    let config_path = std::env::var("CAUSALRT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("causalrt.toml"));
    let config = config::RuntimeConfig::load(&config_path)?;
    tracing::info!(
        initial_backoff_ms = config.initial_backoff_ms,
        max_backoff_ms = config.max_backoff_ms,
        "runtime config loaded"
    );

    let transport = Arc::new(LoopbackTransport::new());
    let partition_id: PartitionId = Uuid16::from_u128(1);
    let subpartition = Arc::new(PipelinedSubpartition::new());
    subpartition.set_current_epoch(EpochId::FIRST);
    transport.register(partition_id, 0, subpartition.clone());

    let channel = InputChannel::new_local(partition_id, 0, 0, transport.clone());
    // The loopback partition above is registered before attachment, so this
    // always succeeds on the first attempt; a real transport would go through
    // `retry_on_partition_not_found` with `config.backoff_policy()` instead.
    channel.request_subpartition().await?;

    tracing::info!("demo subpartition attached, awaiting shutdown signal");
    tokio::signal::ctrl_c().await.ok();
    tracing::info!("shutting down");
    Ok(())
}
