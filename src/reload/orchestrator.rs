//! Reload orchestration.
//!
//! # Responsibilities
//! - Validate the candidate configuration before every start
//! - Build the successor's arguments, including the listener handoff clause
//! - Register started instances and report their completion to the loop
//! - Remove finished instances and decide the supervisor's exit
//!
//! # Design Decisions
//! - Overlapping instances are normal: predecessors drain on their own after handoff
//! - A failed attempt never touches the registry; earlier instances keep serving
//! - Completion watchers only send events; registry removal happens on the loop

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::schema::{FlagConfig, WrapperConfig};
use crate::error::ReloadError;
use crate::event::{Completion, SupervisorEvent};
use crate::observability::metrics;
use crate::process::environment::load_environment;
use crate::process::handle::{self, ProcessHandle, ProcessStatus};
use crate::process::Registry;
use crate::reload::exit::{decide_exit, ExitDecision};

/// Starts successor instances and retires finished ones.
#[derive(Debug)]
pub struct Orchestrator {
    executable: PathBuf,
    args: Vec<String>,
    socket_path: String,
    flags: FlagConfig,
    env_file: Option<PathBuf>,
    registry: Arc<Registry>,
    events: mpsc::UnboundedSender<SupervisorEvent>,
}

impl Orchestrator {
    pub fn new(
        config: &WrapperConfig,
        executable: PathBuf,
        registry: Arc<Registry>,
        events: mpsc::UnboundedSender<SupervisorEvent>,
    ) -> Self {
        Self {
            executable,
            args: config.args.clone(),
            socket_path: config.socket_path.clone(),
            flags: config.flags.clone(),
            env_file: config.env_file.clone(),
            registry,
            events,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Arguments of the check-mode run.
    pub fn validation_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(self.flags.validate_flag.clone());
        args
    }

    /// Arguments of the next instance, handing over from every live one.
    pub async fn spawn_args(&self) -> Vec<String> {
        let pids = self.registry.pids().await;
        handoff_args(&self.args, &self.socket_path, &self.flags, &pids)
    }

    /// Validate, then start and register a new instance.
    ///
    /// Returns the PID of the new instance. On error the registry is unchanged.
    pub async fn start_instance(&self) -> Result<u32, ReloadError> {
        let first_launch = self.registry.is_empty().await;
        let env = load_environment(self.env_file.as_deref());

        if self.flags.validate {
            let outcome = handle::run(&self.executable, &self.validation_args(), &env).await;
            let reason = match outcome {
                Ok(ProcessStatus::Exited(0)) => None,
                Ok(status) => Some(status.to_string()),
                Err(e) => Some(e.to_string()),
            };
            if let Some(reason) = reason {
                tracing::warn!(reason = %reason, first_launch, "validate failed");
                metrics::record_reload("validation_failed");
                return Err(ReloadError::Validation { reason, first_launch });
            }
        }

        let args = self.spawn_args().await;
        let instance = match ProcessHandle::spawn(&self.executable, &args, &env) {
            Ok(instance) => instance,
            Err(source) => {
                tracing::warn!(error = %source, first_launch, "process starting failed");
                metrics::record_reload("spawn_failed");
                return Err(ReloadError::Spawn { source, first_launch });
            }
        };

        let pid = instance.pid();
        tracing::info!(pid, status = %instance.status(), args = ?args, "process started");

        let live = self.registry.insert(instance.clone()).await;
        metrics::record_reload("started");
        metrics::set_instances(live);

        let events = self.events.clone();
        tokio::spawn(async move {
            let status = instance.terminated().await;
            let _ = events.send(SupervisorEvent::InstanceExited(Completion { pid, status }));
        });

        Ok(pid)
    }

    /// Retire a finished instance and decide whether the supervisor exits.
    pub async fn complete(&self, completion: &Completion, terminated: bool) -> ExitDecision {
        tracing::info!(pid = completion.pid, status = %completion.status, "process terminated");

        self.registry.remove(completion.pid).await;
        let remaining = self.registry.len().await;
        metrics::set_instances(remaining);

        let clean = completion.status.exit_code() == Some(0);
        metrics::record_instance_exit(terminated || clean);
        if !terminated && !clean {
            tracing::warn!(pid = completion.pid, remaining, "process exited unexpectedly");
        }

        decide_exit(terminated, &completion.status, remaining)
    }
}

/// Operator arguments, extended with the takeover clause when instances are live.
pub fn handoff_args(base: &[String], socket_path: &str, flags: &FlagConfig, pids: &[u32]) -> Vec<String> {
    let mut args = base.to_vec();
    if !pids.is_empty() {
        args.push(flags.takeover_flag.clone());
        args.push(socket_path.to_string());
        args.push(flags.drain_flag.clone());
        args.extend(pids.iter().map(u32::to_string));
    }
    args
}
