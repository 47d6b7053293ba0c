//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject empty executable, socket path and flags
//! - Require at least one watch path while reloads are enabled
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WrapperConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::WrapperConfig;

/// A single semantic problem with the resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyExecutable,
    EmptySocketPath,
    EmptyFlag(&'static str),
    NoWatchPaths,
    InvalidMetricsAddress(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyExecutable => write!(f, "executable name is empty"),
            ValidationError::EmptySocketPath => write!(f, "handoff socket path is empty"),
            ValidationError::EmptyFlag(name) => write!(f, "flag `{}` is empty", name),
            ValidationError::NoWatchPaths => write!(f, "reload enabled but no watch path resolved"),
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "metrics address `{}` is not a socket address", addr)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a resolved configuration, collecting every problem found.
pub fn validate_config(config: &WrapperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.executable.trim().is_empty() {
        errors.push(ValidationError::EmptyExecutable);
    }
    if config.socket_path.trim().is_empty() {
        errors.push(ValidationError::EmptySocketPath);
    }

    let flags = [
        ("validate_flag", &config.flags.validate_flag),
        ("takeover_flag", &config.flags.takeover_flag),
        ("drain_flag", &config.flags.drain_flag),
    ];
    for (name, value) in flags {
        if value.trim().is_empty() {
            errors.push(ValidationError::EmptyFlag(name));
        }
    }

    if config.watch.enabled && config.watch.paths.is_empty() {
        errors.push(ValidationError::NoWatchPaths);
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
