#![allow(dead_code)]

pub use civet_test_utils::{init_tracing, with_timeout, FakeBackend, FakeRunner, SettingsBuilder};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use civet::backend::SharedBackend;
use civet::fs::mock::MockFileSystem;
use civet::fs::FileSystem;
use civet::types::SourceFile;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Mock filesystem plus a runner writing outputs into it.
pub fn mock_env() -> (MockFileSystem, Arc<dyn FileSystem>, FakeRunner) {
    let mock = MockFileSystem::new();
    let fs: Arc<dyn FileSystem> = Arc::new(mock.clone());
    let runner = FakeRunner::new(fs.clone());
    (mock, fs, runner)
}

pub fn shared(backend: FakeBackend) -> SharedBackend {
    Arc::new(backend)
}

/// A source found under `root` at `logical`.
pub fn source(root: &Path, logical: &str) -> SourceFile {
    SourceFile::new(logical, root.join(logical))
}

pub fn p(s: &str) -> PathBuf {
    PathBuf::from(s)
}
