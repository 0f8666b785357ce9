// src/watch/dispatch.rs

//! Per-event dispatch for one backend.
//!
//! [`plan_event`] is the pure decision (ignore, warn, or compile which
//! unit); [`EventDispatcher`] carries it out. Compile failures here are
//! logged and swallowed. They never stop the watch loop.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::backend::{claims_path, CompilerBackend, SharedBackend};
use crate::compile::{compile_one, CompileOutcome};
use crate::exec::CommandRunner;
use crate::fs::FileSystem;
use crate::mapping::DirectoryMapping;
use crate::types::CompileUnit;
use crate::watch::event::FsEvent;

/// Non-fatal conditions surfaced while watching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchWarning {
    /// A directory was created, deleted or moved. The watched directory set
    /// is fixed at registration time; a restart picks the change up.
    DirectoryEvent { path: PathBuf, action: DirectoryAction },
    /// A watched source was deleted. Its artifact is left in place.
    SourceDeleted { path: PathBuf },
    /// A matching file showed up in a directory with no known destination.
    Unmapped { path: PathBuf },
    /// A file was renamed from one backend's extension to another's.
    CrossBackendRename { from: PathBuf, to: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryAction {
    Created,
    Deleted,
    Moved,
}

impl fmt::Display for WatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchWarning::DirectoryEvent {
                path,
                action: DirectoryAction::Created,
            } => write!(f, "New directory {} created but not watched", path.display()),
            WatchWarning::DirectoryEvent {
                path,
                action: DirectoryAction::Deleted,
            } => write!(f, "Directory {} deleted", path.display()),
            WatchWarning::DirectoryEvent {
                path,
                action: DirectoryAction::Moved,
            } => write!(f, "Directory {} moved; restart to watch its new location", path.display()),
            WatchWarning::SourceDeleted { path } => write!(f, "File {} deleted", path.display()),
            WatchWarning::Unmapped { path } => write!(
                f,
                "No matching destination found for source {}, and the source is not compiled",
                path.display()
            ),
            WatchWarning::CrossBackendRename { from, to } => write!(
                f,
                "File renamed {} -> {} changes its compiler; not compiled",
                from.display(),
                to.display()
            ),
        }
    }
}

/// What to do about one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPlan {
    Ignore,
    Warn(WatchWarning),
    Compile {
        unit: CompileUnit,
        renamed_from: Option<PathBuf>,
    },
}

/// Decide how `backend`'s context reacts to `event`.
///
/// `others` are the remaining enabled backends; they are only consulted to
/// recognise renames that move a file to another backend.
pub fn plan_event(
    backend: &dyn CompilerBackend,
    others: &[SharedBackend],
    mapping: &DirectoryMapping,
    event: &FsEvent,
) -> EventPlan {
    if event.is_dir() {
        let (path, action) = match event {
            FsEvent::Created { path, .. } => (path, DirectoryAction::Created),
            FsEvent::Deleted { path, .. } => (path, DirectoryAction::Deleted),
            FsEvent::Moved { from, .. } => (from, DirectoryAction::Moved),
            FsEvent::Modified { .. } => return EventPlan::Ignore,
        };
        return EventPlan::Warn(WatchWarning::DirectoryEvent {
            path: path.clone(),
            action,
        });
    }

    match event {
        FsEvent::Created { path, .. } | FsEvent::Modified { path, .. } => {
            if !claims_path(backend, path) {
                return EventPlan::Ignore;
            }
            resolve_unit(backend, mapping, path, None)
        }

        FsEvent::Deleted { path, .. } => {
            if claims_path(backend, path) {
                EventPlan::Warn(WatchWarning::SourceDeleted { path: path.clone() })
            } else {
                EventPlan::Ignore
            }
        }

        FsEvent::Moved { from, to, .. } => {
            if !claims_path(backend, from) {
                return EventPlan::Ignore;
            }
            if claims_path(backend, to) {
                return resolve_unit(backend, mapping, to, Some(from.clone()));
            }
            if others.iter().any(|o| claims_path(o.as_ref(), to)) {
                return EventPlan::Warn(WatchWarning::CrossBackendRename {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
            EventPlan::Ignore
        }
    }
}

/// Build the compile unit for `path` from the directory mapping.
fn resolve_unit(
    backend: &dyn CompilerBackend,
    mapping: &DirectoryMapping,
    path: &Path,
    renamed_from: Option<PathBuf>,
) -> EventPlan {
    let unmapped = || EventPlan::Warn(WatchWarning::Unmapped { path: path.to_path_buf() });

    let Some(dst_dir) = path.parent().and_then(|dir| mapping.destination_dir(dir)) else {
        return unmapped();
    };
    let (Some(stem), Some(ext)) = (path.file_stem(), path.extension().and_then(|e| e.to_str()))
    else {
        return unmapped();
    };
    let artifact = backend.destination_path(Path::new(stem), ext);
    let Some(file_name) = artifact.file_name() else {
        return unmapped();
    };

    EventPlan::Compile {
        unit: CompileUnit::new(path, dst_dir.join(file_name), backend.kind()),
        renamed_from,
    }
}

/// Result of handling a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    Warned(WatchWarning),
    Compiled(CompileOutcome),
    /// The compile failed; the error has already been logged.
    Failed { path: PathBuf },
}

/// Carries out [`plan_event`] decisions for one backend context.
#[derive(Clone)]
pub struct EventDispatcher {
    backend: SharedBackend,
    others: Vec<SharedBackend>,
    mapping: Arc<DirectoryMapping>,
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn CommandRunner>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("backend", &self.backend.name())
            .field("mapped_dirs", &self.mapping.len())
            .finish()
    }
}

impl EventDispatcher {
    pub fn new(
        backend: SharedBackend,
        others: Vec<SharedBackend>,
        mapping: Arc<DirectoryMapping>,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            backend,
            others,
            mapping,
            fs,
            runner,
        }
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    pub async fn handle(&self, event: &FsEvent) -> EventOutcome {
        match plan_event(self.backend.as_ref(), &self.others, &self.mapping, event) {
            EventPlan::Ignore => {
                debug!(backend = %self.backend.name(), ?event, "event ignored");
                EventOutcome::Ignored
            }
            EventPlan::Warn(warning) => {
                warn!(backend = %self.backend.name(), "{}", warning);
                EventOutcome::Warned(warning)
            }
            EventPlan::Compile { unit, renamed_from } => {
                if let Some(from) = renamed_from {
                    info!(
                        backend = %self.backend.name(),
                        "File renamed {} -> {}",
                        from.display(),
                        unit.source.display()
                    );
                }
                match compile_one(
                    self.backend.as_ref(),
                    &unit,
                    self.fs.as_ref(),
                    self.runner.as_ref(),
                )
                .await
                {
                    Ok(outcome) => EventOutcome::Compiled(outcome),
                    Err(err) => {
                        error!(backend = %self.backend.name(), source = ?unit.source, "{}", err);
                        EventOutcome::Failed { path: unit.source }
                    }
                }
            }
        }
    }
}
