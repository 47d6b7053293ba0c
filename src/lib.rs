//! Zero-downtime reload wrapper for HAProxy-style load balancers.

pub mod config;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod observability;
pub mod process;
pub mod reload;

pub use config::schema::WrapperConfig;
pub use event::{Completion, SupervisorEvent};
pub use lifecycle::Supervisor;
pub use reload::ExitDecision;
