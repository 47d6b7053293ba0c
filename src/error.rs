//! Error definitions for process supervision.

use std::path::PathBuf;

use nix::sys::signal::Signal;
use thiserror::Error;

/// The supervised executable could not be started.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// Executable missing at the resolved path.
    #[error("executable not found: {0}")]
    NotFound(PathBuf),

    /// Executable exists but may not be executed.
    #[error("permission denied executing {0}")]
    PermissionDenied(PathBuf),

    /// Any other OS failure while starting the process.
    #[error("starting process failed: {0}")]
    Io(#[from] std::io::Error),

    /// The OS reported no identifier for the started process.
    #[error("unable to create process")]
    NoPid,
}

impl SpawnError {
    pub(crate) fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => SpawnError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => SpawnError::PermissionDenied(path.to_path_buf()),
            _ => SpawnError::Io(err),
        }
    }
}

/// A reload attempt was abandoned.
///
/// `first_launch` records whether the registry was empty when the attempt
/// began; such failures leave nothing to fall back to.
#[derive(Debug, Error)]
pub enum ReloadError {
    /// The candidate configuration was rejected by the check mode run.
    #[error("validate failed: {reason}")]
    Validation { reason: String, first_launch: bool },

    /// The successor could not be started.
    #[error("process starting failed: {source}")]
    Spawn {
        #[source]
        source: SpawnError,
        first_launch: bool,
    },
}

impl ReloadError {
    /// Whether the supervisor must give up (no prior instance keeps serving).
    pub fn is_fatal(&self) -> bool {
        match self {
            ReloadError::Validation { first_launch, .. } | ReloadError::Spawn { first_launch, .. } => {
                *first_launch
            }
        }
    }
}

/// The filesystem notification subsystem failed.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("fsnotify watcher create failed: {0}")]
    Create(#[source] notify::Error),

    #[error("watch failed for {}: {source}", .path.display())]
    Add {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Forwarding a signal to one tracked instance failed.
#[derive(Debug, Error)]
#[error("propagating signal {signal:?} to process {pid} failed: {source}")]
pub struct SignalError {
    pub pid: u32,
    pub signal: Signal,
    #[source]
    pub source: nix::Error,
}
