// src/watch/reduce.rs

//! Directory-set reduction.
//!
//! Recursive watches on both `/a` and `/a/b` would deliver every event under
//! `/a/b` twice, so before registering anything we keep only the top-most
//! directories of a set.

use std::path::PathBuf;

/// Minimal set of top-most directories covering every input directory.
///
/// A directory is covered by another iff the other is a proper ancestor of
/// it. Comparison is per path component, so `/foo` never covers `/foobar`.
/// The result is sorted and contains no duplicates; no member is an
/// ancestor of another.
pub fn reduce_directories<I>(dirs: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    // `Path` ordering is component-wise, so every directory sorts before its
    // descendants, and any directory sorting between an ancestor and one of
    // that ancestor's descendants is itself a descendant of the ancestor.
    let mut sorted: Vec<PathBuf> = dirs.into_iter().collect();
    sorted.sort();
    sorted.dedup();

    let mut kept: Vec<PathBuf> = Vec::with_capacity(sorted.len());
    for dir in sorted {
        let covered = kept.last().is_some_and(|last| dir.starts_with(last));
        if !covered {
            kept.push(dir);
        }
    }
    kept
}
