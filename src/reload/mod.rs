//! Reload orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! reload trigger
//!     → orchestrator.rs (check mode run, handoff args, spawn, register)
//!     → completion watcher (one task per instance)
//!     → SupervisorEvent::InstanceExited
//!     → orchestrator.rs (remove) → exit.rs (decide)
//! ```

pub mod exit;
pub mod orchestrator;

pub use exit::{decide_exit, ExitDecision};
pub use orchestrator::{handoff_args, Orchestrator};
