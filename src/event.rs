//! Events consumed by the supervisor loop.

use nix::sys::signal::Signal;

use crate::process::ProcessStatus;

/// Everything the supervisor reacts to, delivered through one queue.
#[derive(Debug)]
pub enum SupervisorEvent {
    /// Raw notification for a watched path.
    FileChanged(notify::Event),
    /// The notification subsystem reported an error.
    WatchFailed(notify::Error),
    /// An OS termination or hot-restart signal arrived.
    Signal(Signal),
    /// A tracked instance finished.
    InstanceExited(Completion),
}

/// Final status of one instance, sent by its completion watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub pid: u32,
    pub status: ProcessStatus,
}
