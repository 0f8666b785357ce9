// src/types.rs

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

/// The closed set of compiler backends civet knows how to drive.
///
/// Which ones are active (and in what order they claim files) is chosen by
/// `[config].backends`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// `.coffee` -> `.js` via `coffee`.
    #[serde(alias = "coffee")]
    CoffeeScript,
    /// `.es6` -> `.js` via `babel`.
    #[serde(alias = "babel")]
    Es6,
    /// `.sass` / `.scss` -> `.css` via `sass`.
    #[serde(alias = "scss")]
    Sass,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [BackendKind::CoffeeScript, BackendKind::Es6, BackendKind::Sass];

    /// Key used for this backend in `[backend.<key>]` and `backends = [...]`.
    pub fn key(self) -> &'static str {
        match self {
            BackendKind::CoffeeScript => "coffeescript",
            BackendKind::Es6 => "es6",
            BackendKind::Sass => "sass",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coffeescript" | "coffee" => Ok(BackendKind::CoffeeScript),
            "es6" | "babel" => Ok(BackendKind::Es6),
            "sass" | "scss" => Ok(BackendKind::Sass),
            other => Err(format!(
                "invalid backend: {other} (expected \"coffeescript\", \"es6\" or \"sass\")"
            )),
        }
    }
}

/// What to do when two compile units of the same backend map one source
/// directory to two different destination directories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingConflictPolicy {
    /// Keep the mapping of the unit seen last and log a warning.
    #[default]
    LastWins,
    /// Refuse to build the watch plan.
    Fail,
}

/// A discovered source file.
///
/// `logical_path` is the path relative to the static-asset root it was found
/// under (e.g. `app/js/foo.coffee`); `absolute_path` is the symlink-resolved
/// location on disk and is the file's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    pub logical_path: PathBuf,
    pub absolute_path: PathBuf,
}

impl SourceFile {
    pub fn new(logical_path: impl Into<PathBuf>, absolute_path: impl Into<PathBuf>) -> Self {
        Self {
            logical_path: logical_path.into(),
            absolute_path: absolute_path.into(),
        }
    }
}

/// One `(source, destination, backend)` triple slated for compilation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompileUnit {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub backend: BackendKind,
}

impl CompileUnit {
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        backend: BackendKind,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            backend,
        }
    }
}
