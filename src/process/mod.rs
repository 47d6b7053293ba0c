//! Child process subsystem.
//!
//! # Data Flow
//! ```text
//! executable.rs (resolve path once at startup)
//!     → environment.rs (inherited env + env file, per spawn)
//!     → handle.rs (spawn, waiter task, completion + status)
//!     → registry.rs (live instances by PID)
//! ```
//!
//! # Design Decisions
//! - Standard streams are inherited untouched
//! - The waiter task is the only code that reaps a child

pub mod environment;
pub mod executable;
pub mod handle;
pub mod registry;

pub use handle::{ProcessHandle, ProcessStatus};
pub use registry::Registry;
