// src/backend/source_map.rs

//! Source-map normalisation for compiled scripts.
//!
//! Compilers invoked with an output directory write maps whose `sourceRoot`
//! and `sources` are relative to the *source* tree, e.g.
//!
//! ```json
//! { "sourceRoot": "../../..", "sources": ["app/static/app/js/foo.coffee"] }
//! ```
//!
//! The serving layer resolves maps relative to the artifact instead, so we
//! rewrite both fields to
//!
//! ```json
//! { "sourceRoot": "", "sources": ["foo.coffee"] }
//! ```

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;

/// Rewrite the map at `map_path` (if present) to point at `source`'s base
/// name.
///
/// Returns `true` if the file was changed. A missing map, or one already in
/// normal form, is left alone.
pub fn rewrite_source_map(fs: &dyn FileSystem, map_path: &Path, source: &Path) -> Result<bool> {
    if !fs.exists(map_path) {
        return Ok(false);
    }

    let source_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let contents = fs.read_to_string(map_path)?;
    match normalize_map(&contents, &source_name)? {
        Some(rewritten) => {
            fs.write(map_path, rewritten.as_bytes())?;
            debug!(map = ?map_path, "rewrote source map");
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Normalise a source map document.
///
/// Returns `None` when the document already has `sourceRoot = ""` and
/// `sources = [source_name]`.
pub fn normalize_map(contents: &str, source_name: &str) -> Result<Option<String>> {
    let mut map: Value = serde_json::from_str(contents)?;

    let wanted_root = Value::String(String::new());
    let wanted_sources = Value::Array(vec![Value::String(source_name.to_string())]);

    let Some(obj) = map.as_object_mut() else {
        return Ok(None);
    };

    if obj.get("sourceRoot") == Some(&wanted_root) && obj.get("sources") == Some(&wanted_sources) {
        return Ok(None);
    }

    obj.insert("sourceRoot".to_string(), wanted_root);
    obj.insert("sources".to_string(), wanted_sources);

    Ok(Some(serde_json::to_string(&map)?))
}
