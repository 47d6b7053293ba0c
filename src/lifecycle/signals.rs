//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for SIGINT, SIGTERM and SIGUSR1 (hot restart)
//! - Translate each delivery into a supervisor event
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Signals join the same queue as file and exit events, so they are
//!   handled one at a time in arrival order

use nix::sys::signal::Signal;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::event::SupervisorEvent;

/// Signals that request termination and are forwarded to every instance.
pub const FORWARDED_SIGNALS: [Signal; 3] = [Signal::SIGINT, Signal::SIGTERM, Signal::SIGUSR1];

/// Install the handlers and spawn a task feeding them into `events`.
///
/// The task ends once the receiving side is gone.
pub fn spawn_signal_listener(events: mpsc::UnboundedSender<SupervisorEvent>) -> std::io::Result<JoinHandle<()>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigusr1 = signal(SignalKind::user_defined1())?;

    Ok(tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = sigint.recv() => Signal::SIGINT,
                Some(()) = sigterm.recv() => Signal::SIGTERM,
                Some(()) = sigusr1.recv() => Signal::SIGUSR1,
                else => break,
            };
            if events.send(SupervisorEvent::Signal(received)).is_err() {
                break;
            }
        }
    }))
}
