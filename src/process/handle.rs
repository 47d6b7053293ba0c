//! Asynchronous child process handle.
//!
//! # Responsibilities
//! - Start the supervised executable with inherited standard streams
//! - Own the OS child in a single background waiter task
//! - Publish the final status exactly once to any number of readers
//!
//! # Design Decisions
//! - Only the waiter reaps the child; everyone else reads the published status
//! - A watch channel doubles as the one-shot completion signal and the
//!   non-blocking status query

use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::process::ExitStatus;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::process::Command;
use tokio::sync::watch;

use crate::error::{SignalError, SpawnError};

/// Most recent known state of a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    NotStarted,
    Running,
    /// Exit code; termination by signal N is reported as `128 + N`.
    Exited(i32),
    /// The waiter could not collect the exit status.
    Failed(String),
}

impl ProcessStatus {
    /// True once the process is gone.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessStatus::Exited(_) | ProcessStatus::Failed(_))
    }

    /// Exit code to propagate, if the process has finished.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessStatus::Exited(code) => Some(*code),
            ProcessStatus::Failed(_) => Some(1),
            ProcessStatus::NotStarted | ProcessStatus::Running => None,
        }
    }
}

impl From<ExitStatus> for ProcessStatus {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ProcessStatus::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ProcessStatus::Exited(128 + signal);
            }
        }
        ProcessStatus::Failed(status.to_string())
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessStatus::NotStarted => write!(f, "not started"),
            ProcessStatus::Running => write!(f, "running"),
            ProcessStatus::Exited(code) => write!(f, "exit status {}", code),
            ProcessStatus::Failed(reason) => write!(f, "{}", reason),
        }
    }
}

/// Handle to one spawned instance.
///
/// Cheap to clone; all clones observe the same status.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    pid: u32,
    status: watch::Receiver<ProcessStatus>,
}

impl ProcessHandle {
    /// Start `executable` and a waiter task that records its final status.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(executable: &Path, args: &[String], env: &[(OsString, OsString)]) -> Result<Self, SpawnError> {
        let (tx, status) = watch::channel(ProcessStatus::NotStarted);

        let mut child = command(executable, args, env)
            .spawn()
            .map_err(|e| SpawnError::from_io(executable, e))?;
        let pid = match child.id() {
            Some(pid) if pid > 0 => pid,
            _ => return Err(SpawnError::NoPid),
        };
        tx.send_replace(ProcessStatus::Running);

        tokio::spawn(async move {
            let final_status = match child.wait().await {
                Ok(status) => ProcessStatus::from(status),
                Err(e) => ProcessStatus::Failed(e.to_string()),
            };
            tx.send_replace(final_status);
        });

        Ok(Self { pid, status })
    }

    /// OS process identifier.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Current status without blocking.
    pub fn status(&self) -> ProcessStatus {
        self.status.borrow().clone()
    }

    /// Wait for the process to finish and return its final status.
    ///
    /// Resolves immediately if it already has.
    pub async fn terminated(&self) -> ProcessStatus {
        let mut rx = self.status.clone();
        let status = rx.wait_for(ProcessStatus::is_terminal).await.map(|s| s.clone());
        status.unwrap_or_else(|_| ProcessStatus::Failed("process waiter stopped".to_string()))
    }

    /// Send `signal` to the process.
    ///
    /// Refused once the exit has been recorded so a reused PID is never hit.
    pub fn signal(&self, signal: Signal) -> Result<(), SignalError> {
        let error = |source| SignalError {
            pid: self.pid,
            signal,
            source,
        };
        if self.status().is_terminal() {
            return Err(error(Errno::ESRCH));
        }
        let pid = i32::try_from(self.pid).map_err(|_| error(Errno::EINVAL))?;
        kill(Pid::from_raw(pid), signal).map_err(error)
    }
}

/// Run `executable` to completion, e.g. for a configuration check.
pub async fn run(executable: &Path, args: &[String], env: &[(OsString, OsString)]) -> Result<ProcessStatus, SpawnError> {
    let status = command(executable, args, env)
        .status()
        .await
        .map_err(|e| SpawnError::from_io(executable, e))?;
    Ok(ProcessStatus::from(status))
}

fn command(executable: &Path, args: &[String], env: &[(OsString, OsString)]) -> Command {
    let mut cmd = Command::new(executable);
    cmd.args(args)
        .env_clear()
        .envs(env.iter().map(|(k, v)| (k, v)));
    cmd
}
