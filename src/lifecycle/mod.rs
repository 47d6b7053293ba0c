//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve executable → Add watches → Install signal handlers → Supervisor::run
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM/SIGUSR1 → SupervisorEvent::Signal
//!
//! Dispatcher (dispatcher.rs):
//!     file change → reload
//!     signal      → set termination flag, forward to instances
//!     exit        → retire instance, maybe exit
//! ```

pub mod dispatcher;
pub mod signals;
pub mod startup;

pub use dispatcher::Supervisor;
