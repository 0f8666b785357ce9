// src/mapping.rs

//! From discovered sources to compile units, and from compile units to the
//! source-dir -> destination-dir mapping the watchers need.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::backend::{claims_path, SharedBackend};
use crate::errors::{CivetError, Result};
use crate::types::{CompileUnit, MappingConflictPolicy, SourceFile};
use crate::watch::reduce::reduce_directories;

/// Compile units claimed by one backend, in discovery order.
#[derive(Debug, Clone)]
pub struct BackendUnits {
    pub backend: SharedBackend,
    pub units: Vec<CompileUnit>,
}

/// Route each source to the first backend that claims it.
///
/// Returns one entry per backend, in the order given (entries may be empty).
/// Sources no backend claims are dropped, including include-only files such
/// as Sass partials.
pub fn classify(sources: &[SourceFile], backends: &[SharedBackend]) -> Vec<BackendUnits> {
    let mut out: Vec<BackendUnits> = backends
        .iter()
        .map(|b| BackendUnits {
            backend: b.clone(),
            units: Vec::new(),
        })
        .collect();

    for source in sources {
        let Some(ext) = source.logical_path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let base = source.logical_path.with_extension("");

        let claimant = out
            .iter_mut()
            .find(|e| claims_path(e.backend.as_ref(), &source.logical_path));
        if let Some(entry) = claimant {
            let destination = entry.backend.destination_path(&base, ext);
            entry.units.push(CompileUnit::new(
                source.absolute_path.clone(),
                destination,
                entry.backend.kind(),
            ));
        }
    }

    for entry in &out {
        debug!(
            backend = %entry.backend.name(),
            units = entry.units.len(),
            "classified sources"
        );
    }

    out
}

/// Source directory -> destination directory, for one backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryMapping {
    dirs: BTreeMap<PathBuf, PathBuf>,
}

impl DirectoryMapping {
    /// Derive the mapping from a backend's compile units.
    ///
    /// If two units disagree about where a source directory goes, `policy`
    /// decides: keep the later one (with a warning) or fail.
    pub fn from_units(units: &[CompileUnit], policy: MappingConflictPolicy) -> Result<Self> {
        let mut dirs: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

        for unit in units {
            let (Some(src_dir), Some(dst_dir)) = (unit.source.parent(), unit.destination.parent())
            else {
                continue;
            };

            if let Some(existing) = dirs.get(src_dir) {
                if existing != dst_dir {
                    match policy {
                        MappingConflictPolicy::Fail => {
                            return Err(CivetError::MappingConflict {
                                dir: src_dir.to_path_buf(),
                                first: existing.clone(),
                                second: dst_dir.to_path_buf(),
                            });
                        }
                        MappingConflictPolicy::LastWins => {
                            warn!(
                                dir = ?src_dir,
                                previous = ?existing,
                                now = ?dst_dir,
                                "source directory maps to two destinations; keeping the last one"
                            );
                        }
                    }
                }
            }

            dirs.insert(src_dir.to_path_buf(), dst_dir.to_path_buf());
        }

        Ok(Self { dirs })
    }

    pub fn destination_dir(&self, source_dir: &Path) -> Option<&Path> {
        self.dirs.get(source_dir).map(PathBuf::as_path)
    }

    pub fn source_dirs(&self) -> impl Iterator<Item = &Path> {
        self.dirs.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Top-most source directories covering every mapped directory.
    pub fn reduced_source_dirs(&self) -> Vec<PathBuf> {
        reduce_directories(self.dirs.keys().cloned())
    }

    /// `(source_dir, destination_dir)` for each top-most source directory.
    pub fn reduced_pairs(&self) -> Vec<(PathBuf, PathBuf)> {
        self.reduced_source_dirs()
            .into_iter()
            .filter_map(|src| {
                let dst = self.dirs.get(&src)?.clone();
                Some((src, dst))
            })
            .collect()
    }
}
