//! Supervisor event loop.
//!
//! # State Transitions
//! ```text
//! supervising ── file change ──────────→ start_instance (unless terminating)
//! supervising ── signal, none running ─→ exit 0
//! supervising ── signal ───────────────→ terminating (forward to all instances)
//! any         ── instance exit ────────→ decide_exit → continue | exit code
//! ```
//!
//! # Design Decisions
//! - One task consumes one queue; each event is fully handled before the next
//! - The loop never exits by itself; only an exit decision ends it
//! - The exit code is returned to the caller, never applied here
//! - When a predecessor and its successor finish at nearly the same time, the
//!   completion that reaches the queue first is handled first; the decision
//!   for the second sees the registry without the first

use std::path::PathBuf;
use std::sync::Arc;

use nix::sys::signal::Signal;
use tokio::sync::mpsc;

use crate::config::schema::WrapperConfig;
use crate::config::watcher::{classify, ChangeKind, ConfigWatcher};
use crate::error::WatchError;
use crate::event::SupervisorEvent;
use crate::observability::metrics;
use crate::process::Registry;
use crate::reload::exit::ExitDecision;
use crate::reload::orchestrator::Orchestrator;

/// Owns the supervisor state and dispatches every event.
#[derive(Debug)]
pub struct Supervisor {
    orchestrator: Orchestrator,
    watcher: Option<ConfigWatcher>,
    events_tx: mpsc::UnboundedSender<SupervisorEvent>,
    events: mpsc::UnboundedReceiver<SupervisorEvent>,
    terminated: bool,
}

impl Supervisor {
    pub fn new(config: &WrapperConfig, executable: PathBuf) -> Self {
        let (events_tx, events) = mpsc::unbounded_channel();
        let registry = Arc::new(Registry::new());
        let orchestrator = Orchestrator::new(config, executable, registry, events_tx.clone());

        Self {
            orchestrator,
            watcher: None,
            events_tx,
            events,
            terminated: false,
        }
    }

    /// Sender for injecting events (signal listener, tests).
    pub fn sender(&self) -> mpsc::UnboundedSender<SupervisorEvent> {
        self.events_tx.clone()
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.orchestrator.registry().clone()
    }

    /// Whether a termination signal has been received.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Watch `paths`, delivering notifications into the event queue.
    pub fn watch(&mut self, paths: &[PathBuf]) -> Result<(), WatchError> {
        let events = self.events_tx.clone();
        let mut watcher = ConfigWatcher::new(move |res| {
            let event = match res {
                Ok(event) => SupervisorEvent::FileChanged(event),
                Err(e) => SupervisorEvent::WatchFailed(e),
            };
            let _ = events.send(event);
        })?;

        for path in paths {
            watcher.add(path)?;
        }
        self.watcher = Some(watcher);
        Ok(())
    }

    /// Start the first instance, then dispatch events until an exit is decided.
    pub async fn run(mut self) -> i32 {
        if let Err(e) = self.orchestrator.start_instance().await {
            if e.is_fatal() {
                tracing::error!(error = %e, "no instance could be started");
                return 1;
            }
        }

        while let Some(event) = self.events.recv().await {
            if let ExitDecision::Exit(code) = self.handle(event).await {
                tracing::info!(code, "supervisor exiting");
                return code;
            }
        }
        // Unreachable while `events_tx` is held.
        0
    }

    /// Handle a single event.
    pub async fn handle(&mut self, event: SupervisorEvent) -> ExitDecision {
        match event {
            SupervisorEvent::FileChanged(event) => self.on_file_changed(event).await,
            SupervisorEvent::WatchFailed(e) => {
                tracing::error!(error = %e, "watch error");
                ExitDecision::Continue
            }
            SupervisorEvent::Signal(signal) => self.on_signal(signal).await,
            SupervisorEvent::InstanceExited(completion) => {
                self.orchestrator.complete(&completion, self.terminated).await
            }
        }
    }

    async fn on_file_changed(&mut self, event: notify::Event) -> ExitDecision {
        let Some(kind) = classify(&event.kind) else {
            tracing::trace!(kind = ?event.kind, paths = ?event.paths, "fs event ignored");
            return ExitDecision::Continue;
        };
        tracing::info!(paths = ?event.paths, kind = kind.as_str(), "fs event");
        metrics::record_fs_event(kind.as_str());

        if kind == ChangeKind::Removed {
            if let Some(watcher) = self.watcher.as_mut() {
                for e in watcher.rewatch(&event) {
                    tracing::error!(error = %e, "watch lost, later changes may be missed");
                }
            }
        }

        if self.terminated {
            tracing::info!("reload skipped, termination in progress");
            metrics::record_reload("refused");
            return ExitDecision::Continue;
        }

        match self.orchestrator.start_instance().await {
            Err(e) if e.is_fatal() => {
                tracing::error!(error = %e, "no instance left to fall back to");
                ExitDecision::Exit(1)
            }
            _ => ExitDecision::Continue,
        }
    }

    async fn on_signal(&mut self, signal: Signal) -> ExitDecision {
        tracing::info!(signal = signal.as_str(), "received signal");

        let registry = self.orchestrator.registry().clone();
        if registry.is_empty().await {
            return ExitDecision::Exit(0);
        }

        // Set before forwarding so every resulting exit counts as expected.
        self.terminated = true;

        let live = registry.len().await;
        let failures = registry.signal_all(signal).await;
        for _ in failures.len()..live {
            metrics::record_signal_forwarded(true);
        }
        for e in failures {
            metrics::record_signal_forwarded(false);
            tracing::warn!(error = %e, "signal not delivered");
        }
        ExitDecision::Continue
    }
}
