// src/config/validate.rs

use std::collections::{BTreeMap, HashSet};

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{CivetError, Result};
use crate::types::BackendKind;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::CivetError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let mut backend = BTreeMap::new();
        for (key, section) in raw.backend {
            let kind = parse_backend_key(&key)?;
            if backend.insert(kind, section).is_some() {
                return Err(CivetError::ConfigError(format!(
                    "[backend.{}]: '{}' is configured more than once",
                    key, kind
                )));
            }
        }

        Ok(ConfigFile::new_unchecked(raw.config, backend))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_dest_root(cfg)?;
    validate_backend_list(cfg)?;
    validate_backend_sections(cfg)?;
    validate_ignore_patterns(cfg)?;
    Ok(())
}

fn validate_dest_root(cfg: &RawConfigFile) -> Result<()> {
    match cfg.config.dest_root {
        Some(ref dir) if !dir.as_os_str().is_empty() => Ok(()),
        _ => Err(CivetError::ConfigError(
            "[config].dest_root must be set to the directory for compiled assets".to_string(),
        )),
    }
}

fn validate_backend_list(cfg: &RawConfigFile) -> Result<()> {
    let Some(ref backends) = cfg.config.backends else {
        return Ok(());
    };

    if backends.is_empty() {
        return Err(CivetError::ConfigError(
            "[config].backends must list at least one backend".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for kind in backends {
        if !seen.insert(*kind) {
            return Err(CivetError::ConfigError(format!(
                "[config].backends lists '{}' more than once",
                kind
            )));
        }
    }
    Ok(())
}

fn validate_backend_sections(cfg: &RawConfigFile) -> Result<()> {
    for (key, section) in cfg.backend.iter() {
        let kind = parse_backend_key(key)?;

        if kind != BackendKind::Sass
            && (section.bundle_gemfile.is_some()
                || section.bundle_bin.is_some()
                || section.native_watch.is_some())
        {
            return Err(CivetError::ConfigError(format!(
                "[backend.{}]: bundle_gemfile, bundle_bin and native_watch only apply to sass",
                key
            )));
        }

        if section.bin.is_some() && section.bundle_gemfile.is_some() {
            return Err(CivetError::ConfigError(format!(
                "[backend.{}]: bin and bundle_gemfile must not be set at the same time",
                key
            )));
        }
    }
    Ok(())
}

fn validate_ignore_patterns(cfg: &RawConfigFile) -> Result<()> {
    for pattern in cfg.config.ignore_patterns.iter() {
        Glob::new(pattern).map_err(|e| {
            CivetError::ConfigError(format!(
                "[config].ignore_patterns: invalid glob '{}': {}",
                pattern, e
            ))
        })?;
    }
    Ok(())
}

fn parse_backend_key(key: &str) -> Result<BackendKind> {
    key.parse::<BackendKind>()
        .map_err(|e| CivetError::ConfigError(format!("[backend.{}]: {}", key, e)))
}
