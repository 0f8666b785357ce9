// src/config/settings.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::model::{BackendSection, ConfigFile};
use crate::types::{BackendKind, MappingConflictPolicy};

/// Name globs every discovery pass skips (version-control metadata, dotfiles
/// and editor backups).
pub const DEFAULT_IGNORE_PATTERNS: [&str; 3] = ["CVS", ".*", "*~"];

/// Resolved settings handed to every component explicitly.
///
/// Unlike [`ConfigFile`], all paths here are absolute (resolved against the
/// config file's directory) and defaults have been applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub dest_root: PathBuf,
    pub static_dirs: Vec<PathBuf>,
    /// Full ignore list: defaults followed by `[config].ignore_patterns`.
    pub ignore_patterns: Vec<String>,
    pub ignore_dirs: Vec<String>,
    pub backends: Vec<BackendKind>,
    pub backend: BTreeMap<BackendKind, BackendSection>,
    pub on_mapping_conflict: MappingConflictPolicy,
}

impl Settings {
    /// Settings with every backend enabled and no overrides.
    pub fn new(dest_root: impl Into<PathBuf>) -> Self {
        Self {
            dest_root: dest_root.into(),
            static_dirs: Vec::new(),
            ignore_patterns: DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect(),
            ignore_dirs: Vec::new(),
            backends: BackendKind::ALL.to_vec(),
            backend: BTreeMap::new(),
            on_mapping_conflict: MappingConflictPolicy::default(),
        }
    }

    /// Build settings from a validated config, resolving relative paths
    /// against `base_dir`.
    pub fn from_config(cfg: &ConfigFile, base_dir: &Path) -> Self {
        let resolve = |p: &Path| -> PathBuf {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base_dir.join(p)
            }
        };

        let dest_root = cfg
            .config
            .dest_root
            .as_deref()
            .map(resolve)
            .unwrap_or_else(|| base_dir.to_path_buf());

        let mut ignore_patterns: Vec<String> =
            DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect();
        ignore_patterns.extend(cfg.config.ignore_patterns.iter().cloned());

        let backend = cfg
            .backend
            .iter()
            .map(|(kind, section)| {
                let mut section = section.clone();
                // `bin` may be a bare name to look up on PATH; only anchor
                // values that actually name a location.
                section.bin = section.bin.map(|p| resolve_if_pathlike(&p, &resolve));
                section.bundle_bin = section.bundle_bin.map(|p| resolve_if_pathlike(&p, &resolve));
                section.bundle_gemfile = section.bundle_gemfile.as_deref().map(resolve);
                (*kind, section)
            })
            .collect();

        Self {
            dest_root,
            static_dirs: cfg.config.static_dirs.iter().map(|p| resolve(p)).collect(),
            ignore_patterns,
            ignore_dirs: cfg.config.ignore_dirs.clone(),
            backends: cfg.enabled_backends(),
            backend,
            on_mapping_conflict: cfg.config.on_mapping_conflict,
        }
    }

    /// Per-backend section, or the defaults if none was configured.
    pub fn backend_section(&self, kind: BackendKind) -> BackendSection {
        self.backend.get(&kind).cloned().unwrap_or_default()
    }
}

fn resolve_if_pathlike(p: &Path, resolve: &impl Fn(&Path) -> PathBuf) -> PathBuf {
    if p.components().count() > 1 {
        resolve(p)
    } else {
        p.to_path_buf()
    }
}
