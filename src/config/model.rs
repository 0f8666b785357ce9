// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{BackendKind, MappingConflictPolicy};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// dest_root = "build/assets"
/// static_dirs = ["app/static", "vendor/static"]
/// ignore_patterns = ["*.orig"]
/// backends = ["coffeescript", "sass"]
///
/// [backend.coffeescript]
/// bin = "node_modules/.bin/coffee"
///
/// [backend.sass]
/// args = ["--compass"]
/// native_watch = true
/// ```
///
/// This is the raw, unvalidated form. Use [`ConfigFile`] (via `TryFrom`) for
/// anything that wants guarantees.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Global settings from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Per-backend settings from `[backend.<kind>]`.
    ///
    /// Keys are backend keys (`"coffeescript"`, `"es6"`, `"sass"`); unknown
    /// keys are rejected during validation.
    #[serde(default)]
    pub backend: BTreeMap<String, BackendSection>,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>`, so holding one means
/// the invariants in `validate.rs` hold.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub backend: BTreeMap<BackendKind, BackendSection>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        backend: BTreeMap<BackendKind, BackendSection>,
    ) -> Self {
        Self { config, backend }
    }

    /// Enabled backends in claim order.
    pub fn enabled_backends(&self) -> Vec<BackendKind> {
        self.config
            .backends
            .clone()
            .unwrap_or_else(|| BackendKind::ALL.to_vec())
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigSection {
    /// Directory all compiled artifacts are written under.
    ///
    /// Required. Relative paths are resolved against the directory holding
    /// the config file.
    #[serde(default)]
    pub dest_root: Option<PathBuf>,

    /// Static-asset search roots scanned for sources.
    #[serde(default)]
    pub static_dirs: Vec<PathBuf>,

    /// Extra name globs to skip during discovery, on top of the built-in
    /// `CVS`, `.*` and `*~`.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Any source whose absolute path contains one of these substrings is
    /// skipped.
    #[serde(default)]
    pub ignore_dirs: Vec<String>,

    /// Enabled backends, in claim order. `None` enables all of them.
    #[serde(default)]
    pub backends: Option<Vec<BackendKind>>,

    /// `"last_wins"` (default) or `"fail"`.
    #[serde(default)]
    pub on_mapping_conflict: MappingConflictPolicy,
}

/// `[backend.<kind>]` section.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct BackendSection {
    /// Explicit executable path; otherwise the backend's well-known name is
    /// looked up on `PATH`.
    #[serde(default)]
    pub bin: Option<PathBuf>,

    /// Extra arguments. `None` means the backend's defaults.
    #[serde(default)]
    pub args: Option<Vec<String>>,

    /// Sass only: run sass through `bundle exec` with this Gemfile.
    #[serde(default)]
    pub bundle_gemfile: Option<PathBuf>,

    /// Sass only: location of `bundle` (defaults to `bundle` on `PATH`).
    #[serde(default)]
    pub bundle_bin: Option<PathBuf>,

    /// Sass only: run one long-lived `sass --watch` instead of compiling on
    /// each file event. Defaults to `true`.
    #[serde(default)]
    pub native_watch: Option<bool>,
}
