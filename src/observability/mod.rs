//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (pid, path, signal, status) instead of formatted strings
//! - Severity mapping: notice → info, warning → warn, alert/emergency → error
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
