use std::path::{Path, PathBuf};

use civet::backend::{output_path, CompilerBackend};
use civet::exec::Invocation;
use civet::mapping::DirectoryMapping;
use civet::types::BackendKind;

/// A backend that claims one extension and compiles with `fakec <src> <dst>`.
#[derive(Debug, Clone)]
pub struct FakeBackend {
    kind: BackendKind,
    name: String,
    source_ext: String,
    out_ext: String,
    dest_root: PathBuf,
    native: Option<Invocation>,
}

impl FakeBackend {
    pub fn new(kind: BackendKind, source_ext: &str, out_ext: &str, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            name: format!("fake-{source_ext}"),
            source_ext: source_ext.to_string(),
            out_ext: out_ext.to_string(),
            dest_root: dest_root.into(),
            native: None,
        }
    }

    /// `.coffee` -> `.js`, reported as the CoffeeScript kind.
    pub fn coffee(dest_root: impl Into<PathBuf>) -> Self {
        Self::new(BackendKind::CoffeeScript, "coffee", "js", dest_root)
    }

    /// `.scss` -> `.css`, reported as the Sass kind.
    pub fn scss(dest_root: impl Into<PathBuf>) -> Self {
        Self::new(BackendKind::Sass, "scss", "css", dest_root)
    }

    /// Use `invocation` as this backend's native watch process.
    pub fn with_native_watch(mut self, invocation: Invocation) -> Self {
        self.native = Some(invocation);
        self
    }
}

impl CompilerBackend for FakeBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, extension: &str) -> bool {
        extension == self.source_ext
    }

    fn destination_path(&self, logical_base: &Path, _extension: &str) -> PathBuf {
        output_path(&self.dest_root, logical_base, &self.out_ext)
    }

    fn build_invocation(&self, source: &Path, destination: &Path) -> Invocation {
        Invocation::new("fakec")
            .arg(source.to_string_lossy())
            .arg(destination.to_string_lossy())
    }

    fn native_watch(&self, mapping: &DirectoryMapping) -> Option<Invocation> {
        if mapping.is_empty() {
            return None;
        }
        self.native.clone()
    }
}
