// tests/workspace_manifest.rs

use std::collections::BTreeSet;
use std::path::Path;

/// The shared test helpers only pull in what they use.
#[test]
fn test_utils_dependencies_are_minimal() -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("crates/test-utils/Cargo.toml");
    let manifest: toml::Table = toml::from_str(&std::fs::read_to_string(path)?)?;

    let deps: BTreeSet<&str> = manifest
        .get("dependencies")
        .and_then(|d| d.as_table())
        .ok_or("dependencies is not a table")?
        .keys()
        .map(String::as_str)
        .collect();

    assert_eq!(deps, BTreeSet::from(["civet", "tokio", "tracing-subscriber"]));
    Ok(())
}
