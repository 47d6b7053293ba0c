//! Startup orchestration.
//!
//! # Responsibilities
//! - Install the metrics exporter when configured
//! - Resolve the supervised executable once
//! - Register watches and signal handlers before the first instance starts
//! - Hand control to the supervisor loop
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Watches exist before the first launch so no change can slip in between

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::WrapperConfig;
use crate::error::WatchError;
use crate::lifecycle::dispatcher::Supervisor;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::observability::metrics;
use crate::process::executable::{lookup_executable, LookupError};

/// Errors that prevent supervision from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error("installing signal handlers failed: {0}")]
    Signals(#[source] std::io::Error),

    #[error("installing metrics exporter failed: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// Bring up every collaborator and supervise until an exit code is decided.
pub async fn start(config: WrapperConfig) -> Result<i32, StartupError> {
    if let Some(addr) = &config.observability.metrics_address {
        // Checked by validation; a parse failure here only disables metrics.
        match addr.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::warn!(address = %addr, error = %e, "metrics disabled"),
        }
    }

    let executable = lookup_executable(&config.executable)?;
    tracing::info!(
        executable = %executable.display(),
        socket = %config.socket_path,
        validate = config.flags.validate,
        "Configuration loaded"
    );

    let mut supervisor = Supervisor::new(&config, executable);

    if config.watch.enabled {
        supervisor.watch(&config.watch.paths)?;
    } else {
        tracing::info!("reload disabled, no watches added");
    }

    spawn_signal_listener(supervisor.sender()).map_err(StartupError::Signals)?;

    Ok(supervisor.run().await)
}
