//! Locating the supervised executable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("executable file not found in $PATH: {0}")]
    NotFound(String),

    #[error("resolving absolute path of {}: {source}", .path.display())]
    Absolute {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Absolute path of `name`, searched on the process `$PATH`.
pub fn lookup_executable(name: &str) -> Result<PathBuf, LookupError> {
    lookup_in(name, std::env::var_os("PATH"))
}

/// Absolute path of `name`, searched on `search_path`.
///
/// Names containing a `/` are not searched; they are used as given.
pub fn lookup_in(name: &str, search_path: Option<OsString>) -> Result<PathBuf, LookupError> {
    let candidate = if name.contains('/') {
        Some(PathBuf::from(name)).filter(|p| is_executable(p))
    } else {
        search_path.and_then(|paths| {
            std::env::split_paths(&paths)
                .map(|dir| {
                    // An empty entry means the current directory.
                    if dir.as_os_str().is_empty() { PathBuf::from(".") } else { dir }
                })
                .map(|dir| dir.join(name))
                .find(|p| is_executable(p))
        })
    };

    let found = candidate.ok_or_else(|| LookupError::NotFound(name.to_string()))?;
    std::path::absolute(&found).map_err(|source| LookupError::Absolute { path: found, source })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
