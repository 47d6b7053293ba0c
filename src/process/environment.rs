//! Environment handed to every spawned instance.
//!
//! Entries are kept as `OsString` pairs: the inherited environment is passed
//! through byte for byte, whether or not it is valid UTF-8.

use std::ffi::OsString;
use std::fs;
use std::path::Path;

/// Parse `KEY=VALUE` lines. Blank lines, `#` comments and lines without `=` are skipped.
///
/// Whitespace around the key and around the value is trimmed, so `WEIGHT = 3`
/// yields `WEIGHT` and `3`.
pub fn parse_env_file(content: &str) -> Vec<(OsString, OsString)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (OsString::from(key), OsString::from(value)))
        .collect()
}

/// The inherited environment, extended by the entries of `env_file`.
///
/// Read on every call so an updated file applies to the next reload.
/// An unreadable file leaves the inherited environment unchanged.
pub fn load_environment(env_file: Option<&Path>) -> Vec<(OsString, OsString)> {
    let mut env: Vec<(OsString, OsString)> = std::env::vars_os().collect();
    if let Some(path) = env_file {
        match fs::read_to_string(path) {
            Ok(content) => merge(&mut env, parse_env_file(&content)),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "env file not loaded"),
        }
    }
    env
}

/// Later entries replace earlier ones with the same key.
fn merge(env: &mut Vec<(OsString, OsString)>, extra: Vec<(OsString, OsString)>) {
    for (key, value) in extra {
        match env.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => env.push((key, value)),
        }
    }
}
