// tests/source_map.rs

mod common;
use crate::common::{mock_env, TestResult};

use std::path::Path;

use serde_json::{json, Value};

use civet::backend::source_map::{normalize_map, rewrite_source_map};
use civet::backend::{CoffeeScriptBackend, CompilerBackend, Es6Backend};

fn parse(s: &str) -> Value {
    serde_json::from_str(s).unwrap()
}

/// The map `coffee --map` leaves behind points back into the source tree;
/// after rewriting it points at the bare file name.
#[test]
fn leaked_source_paths_are_rewritten() -> TestResult {
    let original = json!({
        "version": 3,
        "file": "foo.js",
        "sourceRoot": "../../..",
        "sources": ["app/static/app/js/foo.coffee"],
        "names": [],
        "mappings": "AAAA"
    })
    .to_string();

    let rewritten = normalize_map(&original, "foo.coffee")?.expect("map should change");
    let map = parse(&rewritten);

    assert_eq!(map["sourceRoot"], json!(""));
    assert_eq!(map["sources"], json!(["foo.coffee"]));
    assert_eq!(map["mappings"], json!("AAAA"));
    assert_eq!(map["file"], json!("foo.js"));
    Ok(())
}

/// Rewriting an already rewritten map is a no-op.
#[test]
fn normalised_map_is_left_alone() -> TestResult {
    let map = json!({ "sourceRoot": "", "sources": ["foo.coffee"] }).to_string();
    assert_eq!(normalize_map(&map, "foo.coffee")?, None);
    Ok(())
}

#[test]
fn invalid_json_is_an_error() {
    assert!(normalize_map("{ not json", "foo.coffee").is_err());
}

/// Through the filesystem seam: a second rewrite does not touch the file.
#[test]
fn rewrite_on_disk_is_idempotent() -> TestResult {
    let (mock, fs, _runner) = mock_env();
    let map_path = Path::new("/out/js/foo.js.map");
    mock.add_file(
        map_path,
        json!({ "sourceRoot": "../../..", "sources": ["static/js/foo.es6"] }).to_string(),
    );

    let source = Path::new("/project/static/js/foo.es6");
    assert!(rewrite_source_map(fs.as_ref(), map_path, source)?);
    let tick = mock.mtime_tick(map_path);

    assert!(!rewrite_source_map(fs.as_ref(), map_path, source)?);
    assert_eq!(mock.mtime_tick(map_path), tick);

    let map = parse(&fs.read_to_string(map_path)?);
    assert_eq!(map["sources"], json!(["foo.es6"]));
    Ok(())
}

#[test]
fn missing_map_is_not_an_error() -> TestResult {
    let (_mock, fs, _runner) = mock_env();
    let changed = rewrite_source_map(
        fs.as_ref(),
        Path::new("/out/none.js.map"),
        Path::new("/src/none.coffee"),
    )?;
    assert!(!changed);
    Ok(())
}

/// CoffeeScript's post-process handles whichever map name the compiler
/// version wrote.
#[test]
fn coffee_post_process_rewrites_stem_map() -> TestResult {
    let (mock, fs, _runner) = mock_env();
    mock.add_file(
        "/out/js/foo.map",
        json!({ "sourceRoot": "../..", "sources": ["js/foo.coffee"] }).to_string(),
    );

    let backend = CoffeeScriptBackend::with_executable("/bin/coffee", vec![], "/out");
    backend.post_process(
        fs.as_ref(),
        Path::new("/src/js/foo.coffee"),
        Path::new("/out/js/foo.js"),
    )?;

    let map = parse(&fs.read_to_string(Path::new("/out/js/foo.map"))?);
    assert_eq!(map["sourceRoot"], json!(""));
    assert_eq!(map["sources"], json!(["foo.coffee"]));
    Ok(())
}

#[test]
fn es6_post_process_rewrites_appended_map() -> TestResult {
    let (mock, fs, _runner) = mock_env();
    mock.add_file(
        "/out/js/app.js.map",
        json!({ "sources": ["../static/js/app.es6"] }).to_string(),
    );

    let backend = Es6Backend::with_executable("/bin/babel", vec![], "/out");
    backend.post_process(
        fs.as_ref(),
        Path::new("/src/js/app.es6"),
        Path::new("/out/js/app.js"),
    )?;

    let map = parse(&fs.read_to_string(Path::new("/out/js/app.js.map"))?);
    assert_eq!(map["sourceRoot"], json!(""));
    assert_eq!(map["sources"], json!(["app.es6"]));
    Ok(())
}
