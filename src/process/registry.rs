//! Registry of live instances.
//!
//! # Responsibilities
//! - Track every running instance by its process identifier
//! - Provide snapshots for handoff PID lists and signal propagation
//!
//! # Design Decisions
//! - One `RwLock` guards the map: insert/remove are exclusive, enumeration
//!   and signal forwarding share the lock so they never see a mutation midway
//! - Only handles that already carry a valid PID can be inserted

use std::collections::BTreeMap;

use nix::sys::signal::Signal;
use tokio::sync::RwLock;

use crate::error::SignalError;
use crate::process::handle::ProcessHandle;

/// Set of live instances keyed by PID.
#[derive(Debug, Default)]
pub struct Registry {
    instances: RwLock<BTreeMap<u32, ProcessHandle>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a started instance. Returns the number of live instances.
    ///
    /// A stale entry under the same PID is replaced.
    pub async fn insert(&self, instance: ProcessHandle) -> usize {
        let mut instances = self.instances.write().await;
        instances.insert(instance.pid(), instance);
        instances.len()
    }

    /// Stop tracking `pid`.
    pub async fn remove(&self, pid: u32) -> Option<ProcessHandle> {
        self.instances.write().await.remove(&pid)
    }

    /// Snapshot of all live instances, ordered by PID.
    pub async fn all(&self) -> Vec<ProcessHandle> {
        self.instances.read().await.values().cloned().collect()
    }

    /// Identifiers of all live instances, ordered.
    pub async fn pids(&self) -> Vec<u32> {
        self.instances.read().await.keys().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.instances.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.instances.read().await.is_empty()
    }

    /// Forward `signal` to every live instance.
    ///
    /// A failure for one instance does not stop the others; every failure is returned.
    pub async fn signal_all(&self, signal: Signal) -> Vec<SignalError> {
        let instances = self.instances.read().await;
        instances
            .values()
            .filter_map(|instance| instance.signal(signal).err())
            .collect()
    }
}
