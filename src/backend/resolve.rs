// src/backend/resolve.rs

//! Executable lookup for compiler backends.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{CivetError, Result};

/// Resolve a backend's executable once, at construction time.
///
/// An explicit `override_bin` wins; otherwise `default_name` is searched for
/// on `PATH`. Failure is [`CivetError::BackendUnavailable`], carrying the
/// human-readable backend name and whatever was searched for.
pub fn resolve_executable(
    backend_name: &str,
    override_bin: Option<&Path>,
    default_name: &str,
) -> Result<PathBuf> {
    let path_var = std::env::var_os("PATH");
    resolve_executable_in(backend_name, override_bin, default_name, path_var.as_deref())
}

/// Same as [`resolve_executable`], but searching an explicit `PATH` value.
pub fn resolve_executable_in(
    backend_name: &str,
    override_bin: Option<&Path>,
    default_name: &str,
    path_var: Option<&OsStr>,
) -> Result<PathBuf> {
    let (wanted, from_setting) = match override_bin {
        Some(bin) => (bin.to_path_buf(), true),
        None => (PathBuf::from(default_name), false),
    };

    match find_executable_in(&wanted, path_var) {
        Some(found) => {
            debug!(backend = %backend_name, executable = ?found, "resolved compiler executable");
            Ok(found)
        }
        None => Err(CivetError::BackendUnavailable {
            name: backend_name.to_string(),
            executable: wanted.display().to_string(),
            from_setting,
        }),
    }
}

/// Locate `program` the way a shell would.
///
/// A program containing a directory component is checked as-is; a bare name
/// is searched for in each entry of `path_var`.
pub fn find_executable_in(program: &Path, path_var: Option<&OsStr>) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return is_executable(program).then(|| program.to_path_buf());
    }

    let path_var = path_var?;
    for dir in std::env::split_paths(path_var) {
        for candidate in candidates(&dir.join(program)) {
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

fn candidates(base: &Path) -> Vec<PathBuf> {
    let mut out = vec![base.to_path_buf()];
    if cfg!(windows) && base.extension().is_none() {
        for ext in ["exe", "cmd", "bat"] {
            out.push(base.with_extension(ext));
        }
    }
    out
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
