// src/backend/sass.rs

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::backend::resolve::resolve_executable;
use crate::backend::{output_path, CompilerBackend};
use crate::config::Settings;
use crate::errors::{CivetError, Result};
use crate::exec::Invocation;
use crate::mapping::DirectoryMapping;
use crate::types::BackendKind;

/// Matches the `sass` gem in `bundle list` output, e.g. `  * sass (3.4.25)`.
static BUNDLE_LIST_SASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^.+?sass \(\d+\.\d+.+?\)").expect("literal pattern compiles")
});

/// How the `sass` command is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SassLauncher {
    /// A plain `sass` executable.
    Direct(PathBuf),
    /// `bundle exec sass` with `BUNDLE_GEMFILE` set.
    Bundler { bundle: PathBuf, gemfile: PathBuf },
}

/// Sass / SCSS via `sass [args] <source> <destination>`.
///
/// In watch mode, sass's own `--watch src:dst ...` is used by default rather
/// than per-event compiles.
#[derive(Debug, Clone)]
pub struct SassBackend {
    launcher: SassLauncher,
    args: Vec<String>,
    dest_root: PathBuf,
    native_watch: bool,
}

impl SassBackend {
    pub fn new(settings: &Settings) -> Result<Self> {
        let section = settings.backend_section(BackendKind::Sass);

        let launcher = match section.bundle_gemfile {
            Some(gemfile) => {
                let bundle = resolve_executable(
                    "Sass (via Bundler)",
                    section.bundle_bin.as_deref(),
                    "bundle",
                )?;
                check_bundle_has_sass(&bundle, &gemfile)?;
                SassLauncher::Bundler { bundle, gemfile }
            }
            None => SassLauncher::Direct(resolve_executable("Sass", section.bin.as_deref(), "sass")?),
        };

        Ok(Self::with_launcher(
            launcher,
            section.args.unwrap_or_default(),
            settings.dest_root.clone(),
            section.native_watch.unwrap_or(true),
        ))
    }

    pub fn with_launcher(
        launcher: SassLauncher,
        args: Vec<String>,
        dest_root: impl Into<PathBuf>,
        native_watch: bool,
    ) -> Self {
        Self {
            launcher,
            args,
            dest_root: dest_root.into(),
            native_watch,
        }
    }

    pub fn launcher(&self) -> &SassLauncher {
        &self.launcher
    }

    /// `sass` (or `bundle exec sass`) plus configured arguments.
    fn base_invocation(&self) -> Invocation {
        let inv = match &self.launcher {
            SassLauncher::Direct(sass) => Invocation::new(sass),
            SassLauncher::Bundler { bundle, gemfile } => Invocation::new(bundle)
                .args(["exec", "sass"])
                .env("BUNDLE_GEMFILE", gemfile.to_string_lossy()),
        };
        inv.args(self.args.iter().cloned())
    }
}

impl CompilerBackend for SassBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sass
    }

    fn name(&self) -> &str {
        "Sass"
    }

    fn matches(&self, extension: &str) -> bool {
        extension == "sass" || extension == "scss"
    }

    /// Partials (`_name.scss`) are only ever imported, never compiled alone.
    fn claims_file(&self, path: &Path) -> bool {
        let partial = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('_'));
        !partial
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| self.matches(ext))
    }

    fn destination_path(&self, logical_base: &Path, _extension: &str) -> PathBuf {
        output_path(&self.dest_root, logical_base, "css")
    }

    fn build_invocation(&self, source: &Path, destination: &Path) -> Invocation {
        self.base_invocation()
            .arg(source.to_string_lossy())
            .arg(destination.to_string_lossy())
    }

    fn native_watch(&self, mapping: &DirectoryMapping) -> Option<Invocation> {
        if !self.native_watch || mapping.is_empty() {
            return None;
        }

        // sass watches recursively, so only top-most source dirs are passed.
        let pairs = mapping
            .reduced_pairs()
            .into_iter()
            .map(|(src, dst)| format!("{}:{}", src.display(), dst.display()));

        Some(self.base_invocation().arg("--watch").args(pairs))
    }
}

/// Make sure the bundle behind `gemfile` actually contains sass.
fn check_bundle_has_sass(bundle: &Path, gemfile: &Path) -> Result<()> {
    debug!(bundle = ?bundle, gemfile = ?gemfile, "checking bundle for sass");

    let output = Command::new(bundle)
        .arg("list")
        .env("BUNDLE_GEMFILE", gemfile)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);

    if !output.status.success() {
        let messages: Vec<String> = stdout.lines().map(|l| format!("    {l}")).collect();
        return Err(CivetError::ConfigError(format!(
            "\"bundle list\" failed, exit code = {:?}, messages:\n{}",
            output.status.code(),
            messages.join("\n")
        )));
    }

    if !bundle_lists_sass(&stdout) {
        return Err(CivetError::ConfigError(
            "You have specified to use Bundler to run Sass, but \"sass\" is not included in your bundle."
                .to_string(),
        ));
    }

    info!(gemfile = ?gemfile, "running sass through Bundler");
    Ok(())
}

/// Whether `bundle list` output mentions the sass gem.
pub fn bundle_lists_sass(output: &str) -> bool {
    BUNDLE_LIST_SASS.is_match(output)
}
