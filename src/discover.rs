// src/discover.rs

//! Source discovery for the host.
//!
//! Walks every static-asset root and yields `(logical_path, absolute_path)`
//! pairs with the ignore rules already applied. The build core itself never
//! filters; this is where version-control metadata, dotfiles and editor
//! backups are dropped.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::Settings;
use crate::errors::{CivetError, Result};
use crate::types::SourceFile;

#[derive(Debug, Clone)]
pub struct SourceFinder {
    roots: Vec<PathBuf>,
    ignore: GlobSet,
    ignore_dirs: Vec<String>,
}

impl SourceFinder {
    /// `ignore_patterns` are matched against each file or directory name;
    /// an ignored directory is not descended into. `ignore_dirs` are plain
    /// substrings of the absolute path.
    pub fn new(
        roots: Vec<PathBuf>,
        ignore_patterns: &[String],
        ignore_dirs: Vec<String>,
    ) -> Result<Self> {
        Ok(Self {
            roots,
            ignore: build_globset(ignore_patterns)?,
            ignore_dirs,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.static_dirs.clone(),
            &settings.ignore_patterns,
            settings.ignore_dirs.clone(),
        )
    }

    pub fn is_ignored_name(&self, name: &OsStr) -> bool {
        self.ignore.is_match(Path::new(name))
    }

    fn in_ignored_dir(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.ignore_dirs
            .iter()
            .any(|d| !d.is_empty() && path.contains(d.as_str()))
    }

    fn keep_entry(&self, entry: &DirEntry) -> bool {
        // Roots are configured explicitly; only their contents are filtered.
        entry.depth() == 0 || !self.is_ignored_name(entry.file_name())
    }

    /// Every source file under every root, in root order.
    ///
    /// A logical path already found under an earlier root shadows the same
    /// logical path under later ones. Missing roots are skipped with a
    /// warning.
    pub fn find(&self) -> Result<Vec<SourceFile>> {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut found = Vec::new();

        for root in &self.roots {
            if !root.is_dir() {
                warn!(root = ?root, "static directory does not exist; skipping");
                continue;
            }

            let walker = WalkDir::new(root)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| self.keep_entry(e));

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        warn!(root = ?root, "skipping unreadable entry: {}", err);
                        continue;
                    }
                };
                if !entry.file_type().is_file() || self.in_ignored_dir(entry.path()) {
                    continue;
                }

                let Ok(logical) = entry.path().strip_prefix(root) else {
                    continue;
                };
                if !seen.insert(logical.to_path_buf()) {
                    debug!(logical = ?logical, "shadowed by an earlier static directory");
                    continue;
                }

                let absolute = std::fs::canonicalize(entry.path())?;
                found.push(SourceFile::new(logical, absolute));
            }
        }

        debug!(files = found.len(), "discovery finished");
        Ok(found)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|e| {
            CivetError::ConfigError(format!("invalid ignore pattern {pat:?}: {e}"))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| CivetError::ConfigError(format!("building ignore patterns: {e}")))
}
