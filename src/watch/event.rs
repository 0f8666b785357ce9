// src/watch/event.rs

//! Backend-independent filesystem events.
//!
//! `notify` reports a rich, platform-dependent set of event kinds. The
//! dispatcher only cares about four, so raw events are narrowed here first.

use std::path::{Path, PathBuf};

use notify::event::{CreateKind, MetadataKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsEvent {
    Created { path: PathBuf, is_dir: bool },
    Modified { path: PathBuf, is_dir: bool },
    Deleted { path: PathBuf, is_dir: bool },
    Moved { from: PathBuf, to: PathBuf, is_dir: bool },
}

impl FsEvent {
    pub fn created(path: impl Into<PathBuf>) -> Self {
        FsEvent::Created {
            path: path.into(),
            is_dir: false,
        }
    }

    pub fn modified(path: impl Into<PathBuf>) -> Self {
        FsEvent::Modified {
            path: path.into(),
            is_dir: false,
        }
    }

    pub fn deleted(path: impl Into<PathBuf>) -> Self {
        FsEvent::Deleted {
            path: path.into(),
            is_dir: false,
        }
    }

    pub fn moved(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        FsEvent::Moved {
            from: from.into(),
            to: to.into(),
            is_dir: false,
        }
    }

    pub fn dir_created(path: impl Into<PathBuf>) -> Self {
        FsEvent::Created {
            path: path.into(),
            is_dir: true,
        }
    }

    pub fn dir_deleted(path: impl Into<PathBuf>) -> Self {
        FsEvent::Deleted {
            path: path.into(),
            is_dir: true,
        }
    }

    pub fn is_dir(&self) -> bool {
        match self {
            FsEvent::Created { is_dir, .. }
            | FsEvent::Modified { is_dir, .. }
            | FsEvent::Deleted { is_dir, .. }
            | FsEvent::Moved { is_dir, .. } => *is_dir,
        }
    }

    /// The path the event is "about": the new name for moves.
    pub fn path(&self) -> &Path {
        match self {
            FsEvent::Created { path, .. }
            | FsEvent::Modified { path, .. }
            | FsEvent::Deleted { path, .. } => path,
            FsEvent::Moved { to, .. } => to,
        }
    }

    /// Narrow one `notify` event into zero or more `FsEvent`s.
    ///
    /// Access and metadata-only (atime) events are dropped. Renames reported
    /// as a single `Both` event become `Moved`; half-renames become
    /// `Deleted` / `Created`.
    pub fn from_notify(event: &Event) -> Vec<FsEvent> {
        match event.kind {
            EventKind::Create(kind) => event
                .paths
                .iter()
                .map(|p| FsEvent::Created {
                    path: p.clone(),
                    is_dir: match kind {
                        CreateKind::Folder => true,
                        CreateKind::File => false,
                        _ => p.is_dir(),
                    },
                })
                .collect(),

            EventKind::Remove(kind) => event
                .paths
                .iter()
                .map(|p| FsEvent::Deleted {
                    path: p.clone(),
                    is_dir: matches!(kind, RemoveKind::Folder),
                })
                .collect(),

            EventKind::Modify(ModifyKind::Name(mode)) => rename_events(mode, &event.paths),

            EventKind::Modify(ModifyKind::Metadata(MetadataKind::AccessTime)) => Vec::new(),

            EventKind::Modify(_) => event
                .paths
                .iter()
                .map(|p| FsEvent::Modified {
                    path: p.clone(),
                    is_dir: p.is_dir(),
                })
                .collect(),

            EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
        }
    }
}

fn rename_events(mode: RenameMode, paths: &[PathBuf]) -> Vec<FsEvent> {
    match (mode, paths) {
        (RenameMode::Both, [from, to, ..]) => vec![FsEvent::Moved {
            from: from.clone(),
            to: to.clone(),
            is_dir: to.is_dir(),
        }],
        (RenameMode::From, _) => paths
            .iter()
            .map(|p| FsEvent::Deleted {
                path: p.clone(),
                is_dir: false,
            })
            .collect(),
        (RenameMode::To, _) => paths
            .iter()
            .map(|p| FsEvent::Created {
                path: p.clone(),
                is_dir: p.is_dir(),
            })
            .collect(),
        // Backends that cannot pair renames: decide by what is on disk now.
        _ => paths
            .iter()
            .map(|p| {
                if p.exists() {
                    FsEvent::Created {
                        path: p.clone(),
                        is_dir: p.is_dir(),
                    }
                } else {
                    FsEvent::Deleted {
                        path: p.clone(),
                        is_dir: false,
                    }
                }
            })
            .collect(),
    }
}

/// Joins the halves of a rename reported by the OS.
///
/// inotify reports one rename as a `From` half, a `To` half and a paired
/// `Both` event, all carrying the same tracker cookie. Left alone, the halves
/// would show up as a spurious delete and create next to the move.
///
/// - A tracked `From` half is dropped. Either its `Both` follows, or the file
///   left the watched tree and its artifact stays, as for any delete.
/// - A tracked `To` half is held back. If the matching `Both` arrives it is
///   discarded; otherwise [`RenamePairer::flush`] releases it as a creation
///   (a file moved in from outside).
#[derive(Debug, Default)]
pub struct RenamePairer {
    pending_to: Option<Event>,
}

impl RenamePairer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_to.is_some()
    }

    /// Feed one raw event; returns whatever is ready to dispatch.
    pub fn push(&mut self, event: Event) -> Vec<FsEvent> {
        let tracker = event.tracker();
        match (event.kind, tracker) {
            (EventKind::Modify(ModifyKind::Name(RenameMode::From)), Some(_)) => self.flush(),
            (EventKind::Modify(ModifyKind::Name(RenameMode::To)), Some(_)) => {
                let out = self.flush();
                self.pending_to = Some(event);
                out
            }
            (EventKind::Modify(ModifyKind::Name(RenameMode::Both)), Some(cookie)) => {
                if self.pending_to.as_ref().and_then(Event::tracker) == Some(cookie) {
                    self.pending_to = None;
                }
                let mut out = self.flush();
                out.extend(FsEvent::from_notify(&event));
                out
            }
            _ => {
                let mut out = self.flush();
                out.extend(FsEvent::from_notify(&event));
                out
            }
        }
    }

    /// Release a held-back `To` half whose pair never arrived.
    pub fn flush(&mut self) -> Vec<FsEvent> {
        self.pending_to
            .take()
            .map(|event| FsEvent::from_notify(&event))
            .unwrap_or_default()
    }
}
