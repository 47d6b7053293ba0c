//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML settings file, environment, `-f` argument)
//!     → validation.rs (semantic checks)
//!     → WrapperConfig (validated, immutable)
//!
//! While supervising:
//!     watcher.rs detects change on a watched path
//!     → SupervisorEvent::FileChanged
//!     → reload of the supervised executable
//! ```
//!
//! # Design Decisions
//! - Settings are resolved once at startup
//! - The supervised executable's own configuration is never parsed here;
//!   its check mode decides whether a change is acceptable

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::WrapperConfig;
pub use schema::FlagConfig;
pub use schema::ObservabilityConfig;
pub use schema::WatchConfig;
