#![allow(dead_code)]

use std::path::PathBuf;

use civet::config::{BackendSection, Settings};
use civet::types::{BackendKind, MappingConflictPolicy};

/// Builder for `Settings` to simplify test setup.
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new(dest_root: impl Into<PathBuf>) -> Self {
        Self {
            settings: Settings::new(dest_root),
        }
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.static_dirs.push(dir.into());
        self
    }

    pub fn with_ignore_pattern(mut self, pattern: &str) -> Self {
        self.settings.ignore_patterns.push(pattern.to_string());
        self
    }

    pub fn with_ignore_dir(mut self, dir: &str) -> Self {
        self.settings.ignore_dirs.push(dir.to_string());
        self
    }

    pub fn with_backends(mut self, backends: &[BackendKind]) -> Self {
        self.settings.backends = backends.to_vec();
        self
    }

    /// Point `kind` at an explicit executable.
    pub fn with_bin(mut self, kind: BackendKind, bin: impl Into<PathBuf>) -> Self {
        self.settings.backend.entry(kind).or_default().bin = Some(bin.into());
        self
    }

    pub fn with_args(mut self, kind: BackendKind, args: &[&str]) -> Self {
        self.settings.backend.entry(kind).or_default().args =
            Some(args.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_section(mut self, kind: BackendKind, section: BackendSection) -> Self {
        self.settings.backend.insert(kind, section);
        self
    }

    pub fn with_mapping_conflict(mut self, policy: MappingConflictPolicy) -> Self {
        self.settings.on_mapping_conflict = policy;
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}
