//! Configuration schema definitions.
//!
//! This module defines the complete settings structure for the wrapper.
//! All types derive `Deserialize` so an optional TOML file can provide them;
//! environment variables are layered on top by the loader.

use std::path::PathBuf;

use serde::Deserialize;

/// Name of the supervised executable looked up on `$PATH`.
pub const DEFAULT_EXECUTABLE: &str = "haproxy";

/// Socket used by a new instance to fetch listeners from its predecessors.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/haproxy.sock";

/// Configuration file assumed when the arguments carry no `-f <file>`.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/haproxy/haproxy.cfg";

/// Root configuration for the reload wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WrapperConfig {
    /// Executable name (or path) of the supervised load balancer.
    pub executable: String,

    /// Socket path handed to successors for listener takeover.
    pub socket_path: String,

    /// Filesystem watch settings.
    pub watch: WatchConfig,

    /// Optional file with extra `KEY=VALUE` environment entries.
    pub env_file: Option<PathBuf>,

    /// Command-line flags understood by the supervised executable.
    pub flags: FlagConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Operator argument vector passed through to every instance.
    #[serde(skip)]
    pub args: Vec<String>,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
            watch: WatchConfig::default(),
            env_file: None,
            flags: FlagConfig::default(),
            observability: ObservabilityConfig::default(),
            args: Vec::new(),
        }
    }
}

/// Filesystem watch configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Reload on configuration changes. When false no watches are added.
    pub enabled: bool,

    /// Paths to watch, in registration order.
    pub paths: Vec<PathBuf>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            paths: Vec::new(),
        }
    }
}

/// Flags appended to the operator arguments for validation and handoff.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlagConfig {
    /// Run the executable in check mode before every start.
    pub validate: bool,

    /// Flag selecting check mode (e.g. `-c`).
    pub validate_flag: String,

    /// Flag followed by the socket path for listener takeover (e.g. `-x`).
    pub takeover_flag: String,

    /// Flag followed by the PIDs that should finish and exit (e.g. `-sf`).
    pub drain_flag: String,
}

impl Default for FlagConfig {
    fn default() -> Self {
        Self {
            validate: true,
            validate_flag: "-c".to_string(),
            takeover_flag: "-x".to_string(),
            drain_flag: "-sf".to_string(),
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human readable or JSON log lines.
    pub log_format: LogFormat,

    /// Prometheus endpoint bind address. Disabled when absent.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_address: None,
        }
    }
}
