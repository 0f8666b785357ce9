// src/backend/coffeescript.rs

use std::path::{Path, PathBuf};

use crate::backend::resolve::resolve_executable;
use crate::backend::source_map::rewrite_source_map;
use crate::backend::{output_path, CompilerBackend};
use crate::config::Settings;
use crate::errors::Result;
use crate::exec::Invocation;
use crate::fs::FileSystem;
use crate::types::BackendKind;

pub const DEFAULT_ARGS: [&str; 2] = ["--compile", "--map"];

/// CoffeeScript via `coffee -o <dest_dir> [args] <source>`.
///
/// `coffee` creates the output directory itself and names the artifact after
/// the source, so only the destination directory is passed.
#[derive(Debug, Clone)]
pub struct CoffeeScriptBackend {
    executable: PathBuf,
    args: Vec<String>,
    dest_root: PathBuf,
}

impl CoffeeScriptBackend {
    pub fn new(settings: &Settings) -> Result<Self> {
        let section = settings.backend_section(BackendKind::CoffeeScript);
        let executable = resolve_executable("CoffeeScript", section.bin.as_deref(), "coffee")?;
        let args = section
            .args
            .unwrap_or_else(|| DEFAULT_ARGS.iter().map(|s| s.to_string()).collect());
        Ok(Self::with_executable(executable, args, settings.dest_root.clone()))
    }

    /// Construct without any `PATH` lookup.
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

    /// Map files `coffee --map` may have written next to `destination`.
    ///
    /// Older compilers write `foo.map`, newer ones `foo.js.map`.
    fn map_candidates(destination: &Path) -> Vec<PathBuf> {
        let mut out = vec![destination.with_extension("map")];
        let mut js_map = destination.as_os_str().to_owned();
        js_map.push(".map");
        out.push(PathBuf::from(js_map));
        out
    }
}

impl CompilerBackend for CoffeeScriptBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::CoffeeScript
    }

    fn name(&self) -> &str {
        "CoffeeScript"
    }

    fn matches(&self, extension: &str) -> bool {
        extension == "coffee"
    }

    fn destination_path(&self, logical_base: &Path, _extension: &str) -> PathBuf {
        output_path(&self.dest_root, logical_base, "js")
    }

    fn build_invocation(&self, source: &Path, destination: &Path) -> Invocation {
        let dest_dir = destination.parent().unwrap_or(&self.dest_root);
        Invocation::new(&self.executable)
            .arg("-o")
            .arg(dest_dir.to_string_lossy())
            .args(self.args.iter().cloned())
            .arg(source.to_string_lossy())
    }

    fn post_process(&self, fs: &dyn FileSystem, source: &Path, destination: &Path) -> Result<()> {
        for map in Self::map_candidates(destination) {
            rewrite_source_map(fs, &map, source)?;
        }
        Ok(())
    }
}
