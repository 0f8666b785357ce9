// src/backend/es6.rs

use std::path::{Path, PathBuf};

use crate::backend::resolve::resolve_executable;
use crate::backend::source_map::rewrite_source_map;
use crate::backend::{output_path, CompilerBackend};
use crate::config::Settings;
use crate::errors::Result;
use crate::exec::Invocation;
use crate::fs::FileSystem;
use crate::types::BackendKind;

pub const DEFAULT_ARGS: [&str; 2] = ["--source-maps", "true"];

/// ECMAScript 6 through `babel [args] -o <destination> <source>`.
///
/// babel writes its map to `<destination>.map`.
#[derive(Debug, Clone)]
pub struct Es6Backend {
    executable: PathBuf,
    args: Vec<String>,
    dest_root: PathBuf,
}

impl Es6Backend {
    pub fn new(settings: &Settings) -> Result<Self> {
        let section = settings.backend_section(BackendKind::Es6);
        let executable = resolve_executable("Ecmascript 6", section.bin.as_deref(), "babel")?;
        let args = section
            .args
            .unwrap_or_else(|| DEFAULT_ARGS.iter().map(|s| s.to_string()).collect());
        Ok(Self::with_executable(executable, args, settings.dest_root.clone()))
    }

    pub fn with_executable(
        executable: impl Into<PathBuf>,
        args: Vec<String>,
        dest_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executable: executable.into(),
            args,
            dest_root: dest_root.into(),
        }
    }
}

impl CompilerBackend for Es6Backend {
    fn kind(&self) -> BackendKind {
        BackendKind::Es6
    }

    fn name(&self) -> &str {
        "Ecmascript 6"
    }

    fn matches(&self, extension: &str) -> bool {
        extension == "es6"
    }

    fn destination_path(&self, logical_base: &Path, _extension: &str) -> PathBuf {
        output_path(&self.dest_root, logical_base, "js")
    }

    fn build_invocation(&self, source: &Path, destination: &Path) -> Invocation {
        Invocation::new(&self.executable)
            .args(self.args.iter().cloned())
            .arg("-o")
            .arg(destination.to_string_lossy())
            .arg(source.to_string_lossy())
    }

    fn post_process(&self, fs: &dyn FileSystem, source: &Path, destination: &Path) -> Result<()> {
        let mut map = destination.as_os_str().to_owned();
        map.push(".map");
        rewrite_source_map(fs, Path::new(&map), source)?;
        Ok(())
    }
}
