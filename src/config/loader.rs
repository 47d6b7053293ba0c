//! Configuration loading from disk and the process environment.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{LogFormat, WrapperConfig, DEFAULT_CONFIG_FILE};
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_SETTINGS_FILE: &str = "RELOAD_WRAPPER_CONFIG";
pub const ENV_EXECUTABLE: &str = "HAPROXY_EXECUTABLE";
pub const ENV_SOCKET: &str = "HAPROXY_SOCKET";
pub const ENV_WATCH_PATH: &str = "WATCH_PATH";
pub const ENV_DISABLE_RELOAD: &str = "DISABLE_RELOAD";
pub const ENV_FILE: &str = "ENV_FILE";
pub const ENV_VALIDATE: &str = "VALIDATE_CONFIG";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
pub const ENV_METRICS_ADDRESS: &str = "METRICS_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Parse a TOML settings file. Semantic checks happen after env overlay.
pub fn load_config(path: &Path) -> Result<WrapperConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Resolve the configuration from the real process environment.
///
/// Variables whose name or value is not valid UTF-8 cannot be settings and are skipped.
pub fn resolve_from_env(args: Vec<String>) -> Result<WrapperConfig, ConfigError> {
    let vars: HashMap<String, String> = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect();
    resolve(args, &vars)
}

/// Resolve the configuration: defaults, then the optional settings file,
/// then environment variables, then watch paths derived from the arguments.
pub fn resolve(args: Vec<String>, vars: &HashMap<String, String>) -> Result<WrapperConfig, ConfigError> {
    let mut config = match vars.get(ENV_SETTINGS_FILE) {
        Some(path) => load_config(Path::new(path))?,
        None => WrapperConfig::default(),
    };

    if let Some(executable) = vars.get(ENV_EXECUTABLE) {
        config.executable = executable.clone();
    }
    if let Some(socket) = vars.get(ENV_SOCKET) {
        config.socket_path = socket.clone();
    }
    if let Some(file) = vars.get(ENV_FILE) {
        config.env_file = Some(PathBuf::from(file));
    }
    if let Some(disabled) = vars.get(ENV_DISABLE_RELOAD).and_then(|v| parse_bool(v)) {
        config.watch.enabled = !disabled;
    }
    if let Some(validate) = vars.get(ENV_VALIDATE).and_then(|v| parse_bool(v)) {
        config.flags.validate = validate;
    }
    if let Some(level) = vars.get(ENV_LOG_LEVEL) {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = vars.get(ENV_LOG_FORMAT) {
        config.observability.log_format = match format.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };
    }
    if let Some(addr) = vars.get(ENV_METRICS_ADDRESS).filter(|v| !v.is_empty()) {
        config.observability.metrics_address = Some(addr.clone());
    }

    match vars.get(ENV_WATCH_PATH).map(|v| split_paths(v)) {
        Some(paths) if !paths.is_empty() => config.watch.paths = paths,
        _ if config.watch.paths.is_empty() => {
            config.watch.paths = vec![config_file_from_args(&args)];
        }
        _ => {}
    }

    config.args = args;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// The configuration file named by the last `-f <file>` pair of the arguments.
pub fn config_file_from_args(args: &[String]) -> PathBuf {
    args.windows(2)
        .filter(|pair| pair[0] == "-f")
        .last()
        .map(|pair| PathBuf::from(&pair[1]))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Split a watch list on `:` or `,`, dropping empty entries.
fn split_paths(value: &str) -> Vec<PathBuf> {
    value
        .split([':', ','])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
