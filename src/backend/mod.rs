// src/backend/mod.rs

//! Compiler backends.
//!
//! A backend wraps one external toolchain: which extensions it claims, where
//! its output goes, how to invoke it, and what (if anything) to do with the
//! artifact afterwards. The set of backends is closed ([`BackendKind`]) and
//! selected by configuration; each one implements [`CompilerBackend`].
//!
//! - [`coffeescript`]: `.coffee` -> `.js` (with source-map rewriting).
//! - [`es6`]: `.es6` -> `.js` through babel (with source-map rewriting).
//! - [`sass`]: `.sass` / `.scss` -> `.css`, optionally through Bundler, with
//!   a native `--watch` mode.
//! - [`resolve`]: executable lookup shared by all of them.
//! - [`source_map`]: the map normalisation used by the script backends.

pub mod coffeescript;
pub mod es6;
pub mod resolve;
pub mod sass;
pub mod source_map;

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;
use crate::errors::Result;
use crate::exec::Invocation;
use crate::fs::FileSystem;
use crate::mapping::DirectoryMapping;
use crate::types::BackendKind;

pub use coffeescript::CoffeeScriptBackend;
pub use es6::Es6Backend;
pub use sass::SassBackend;

/// Shared handle to a backend; the orchestrator and every watch context hold
/// one.
pub type SharedBackend = Arc<dyn CompilerBackend>;

/// Capability interface every backend implements.
///
/// All methods except `post_process` are pure: they never touch the
/// filesystem or spawn anything.
pub trait CompilerBackend: Send + Sync + fmt::Debug {
    fn kind(&self) -> BackendKind;

    /// Human visible name (e.g. "CoffeeScript").
    fn name(&self) -> &str;

    /// Whether files with this extension (no leading dot) belong to us.
    fn matches(&self, extension: &str) -> bool;

    /// Whether the file at `path` is compiled on its own. Defaults to the
    /// extension check; backends with include-only files narrow it.
    fn claims_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.matches(ext))
    }

    /// Destination for a file whose logical path, minus extension, is
    /// `logical_base`.
    fn destination_path(&self, logical_base: &Path, extension: &str) -> PathBuf;

    /// Process invocation compiling `source` into `destination`.
    fn build_invocation(&self, source: &Path, destination: &Path) -> Invocation;

    /// Hook run only after a successful invocation. Must be idempotent.
    fn post_process(&self, _fs: &dyn FileSystem, _source: &Path, _destination: &Path) -> Result<()> {
        Ok(())
    }

    /// Long-lived watch process covering `mapping`, for tools with their own
    /// watch mode. `None` means "compile per file event".
    fn native_watch(&self, _mapping: &DirectoryMapping) -> Option<Invocation> {
        None
    }
}

/// Does `backend` claim the file at `path`?
pub fn claims_path(backend: &dyn CompilerBackend, path: &Path) -> bool {
    backend.claims_file(path)
}

/// `<dest_root>/<logical_base>.<out_ext>`, keeping any dots already in the
/// base (`js/app.min` -> `js/app.min.js`).
pub fn output_path(dest_root: &Path, logical_base: &Path, out_ext: &str) -> PathBuf {
    let mut name = OsString::from(logical_base.as_os_str());
    name.push(".");
    name.push(out_ext);
    dest_root.join(name)
}

/// Instantiate every enabled backend, in claim order.
///
/// Fails fast with `BackendUnavailable` if any executable cannot be found.
pub fn build_backends(settings: &Settings) -> Result<Vec<SharedBackend>> {
    let mut backends: Vec<SharedBackend> = Vec::with_capacity(settings.backends.len());
    for kind in settings.backends.iter().copied() {
        let backend: SharedBackend = match kind {
            BackendKind::CoffeeScript => Arc::new(CoffeeScriptBackend::new(settings)?),
            BackendKind::Es6 => Arc::new(Es6Backend::new(settings)?),
            BackendKind::Sass => Arc::new(SassBackend::new(settings)?),
        };
        backends.push(backend);
    }
    Ok(backends)
}
