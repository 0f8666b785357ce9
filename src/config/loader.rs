// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::config::settings::Settings;
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Load, validate and resolve a config file into [`Settings`].
///
/// Relative paths inside the file are taken relative to the file's own
/// directory, not the process's working directory.
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    let cfg = load_and_validate(path)?;
    Ok(Settings::from_config(&cfg, &config_base_dir(path)))
}

/// Directory relative config paths are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "configs/Civet.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Civet.toml" (parent = ""),
///   we fall back to the current working directory.
pub fn config_base_dir(config_path: &Path) -> PathBuf {
    let base = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.canonicalize().unwrap_or(base)
}
