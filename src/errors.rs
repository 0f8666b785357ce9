// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CivetError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A backend's executable could not be resolved at startup.
    ///
    /// `from_setting` is true when the executable came from an explicit
    /// `bin = "..."` override rather than a bare-name `PATH` lookup.
    #[error("{}", backend_unavailable_message(.name, .executable, .from_setting))]
    BackendUnavailable {
        name: String,
        executable: String,
        from_setting: bool,
    },

    #[error("Compilation of {path:?} failed (exit code {code:?})")]
    CompileFailed { path: PathBuf, code: Option<i32> },

    #[error(
        "Source directory {dir:?} maps to both {first:?} and {second:?}"
    )]
    MappingConflict {
        dir: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Source map error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("File watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn backend_unavailable_message(name: &str, executable: &str, from_setting: &bool) -> String {
    if *from_setting {
        format!(
            "Your project uses {name}, but \"{executable}\" specified in the {name} backend's `bin` setting is not found."
        )
    } else {
        format!("Your project uses {name}, but \"{executable}\" is not found in your PATH.")
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CivetError>;
