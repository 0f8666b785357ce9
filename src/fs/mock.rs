// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub enum MockEntry {
    /// File contents plus the logical tick at which it was last written.
    File { content: Vec<u8>, mtime: u64 },
    Dir,
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    clock: u64,
}

/// In-memory filesystem with a logical modification clock.
///
/// Every write advances the clock by one tick, so "written later" always
/// means "strictly newer mtime" regardless of wall-clock resolution.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.lock();
        state.clock += 1;
        let mtime = state.clock;

        if let Some(parent) = path.parent() {
            Self::ensure_dirs(&mut state.entries, parent);
        }
        state.entries.insert(
            path,
            MockEntry::File {
                content: content.into(),
                mtime,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        Self::ensure_dirs(&mut state.entries, path.as_ref());
    }

    /// Bump the file's mtime to a fresh tick without changing its content.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        state.clock += 1;
        let now = state.clock;
        if let Some(MockEntry::File { mtime, .. }) = state.entries.get_mut(path.as_ref()) {
            *mtime = now;
        }
    }

    /// Force a specific logical mtime.
    pub fn set_mtime(&self, path: impl AsRef<Path>, tick: u64) {
        let mut state = self.lock();
        if let Some(MockEntry::File { mtime, .. }) = state.entries.get_mut(path.as_ref()) {
            *mtime = tick;
        }
        if tick > state.clock {
            state.clock = tick;
        }
    }

    pub fn mtime_tick(&self, path: impl AsRef<Path>) -> Option<u64> {
        let state = self.lock();
        match state.entries.get(path.as_ref()) {
            Some(MockEntry::File { mtime, .. }) => Some(*mtime),
            _ => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_dirs(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::File { content, .. }) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.lock();
        state.entries.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let state = self.lock();
        matches!(state.entries.get(path), Some(MockEntry::Dir))
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::File { mtime, .. }) => {
                Ok(SystemTime::UNIX_EPOCH + Duration::from_secs(*mtime))
            }
            Some(MockEntry::Dir) => Ok(SystemTime::UNIX_EPOCH),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::File { .. }) => {
                state.entries.remove(path);
                Ok(())
            }
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.add_dir(path);
        Ok(())
    }
}
