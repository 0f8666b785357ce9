// src/compile/mod.rs

//! Compile engine.
//!
//! - [`compile_one`]: staleness check, stale-artifact removal, invocation and
//!   post-processing for a single unit.
//! - [`compile_all`]: sequential, fail-fast batch over a list of units.
//!
//! Modification times on disk are the only cache. Nothing compiled is kept
//! in memory.

use std::time::Instant;

use tracing::{debug, error, info};

use crate::backend::CompilerBackend;
use crate::errors::{CivetError, Result};
use crate::exec::CommandRunner;
use crate::fs::FileSystem;
use crate::types::CompileUnit;

/// What a successful `compile_one` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileOutcome {
    /// Destination was already up to date; nothing was spawned.
    Skipped,
    /// The external compiler ran and succeeded.
    Compiled,
}

/// Summary of a batch that ran to completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub compiled: usize,
    pub skipped: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.compiled + self.skipped
    }

    fn record(&mut self, outcome: CompileOutcome) {
        match outcome {
            CompileOutcome::Compiled => self.compiled += 1,
            CompileOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Destination exists and is at least as new as the source.
pub fn is_up_to_date(fs: &dyn FileSystem, unit: &CompileUnit) -> Result<bool> {
    if !fs.exists(&unit.destination) {
        return Ok(false);
    }
    let src = fs.modified(&unit.source)?;
    let dst = fs.modified(&unit.destination)?;
    Ok(dst >= src)
}

/// Compile a single unit if it is missing or stale.
///
/// A stale destination is removed before the compiler runs, so a failed
/// compile leaves the destination absent rather than outdated. A nonzero exit
/// is reported as [`CivetError::CompileFailed`].
pub async fn compile_one(
    backend: &dyn CompilerBackend,
    unit: &CompileUnit,
    fs: &dyn FileSystem,
    runner: &dyn CommandRunner,
) -> Result<CompileOutcome> {
    if is_up_to_date(fs, unit)? {
        debug!(source = ?unit.source, "up to date, skipping");
        return Ok(CompileOutcome::Skipped);
    }

    if fs.exists(&unit.destination) {
        debug!(destination = ?unit.destination, "removing stale artifact");
        fs.remove_file(&unit.destination)?;
    }

    if let Some(parent) = unit.destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs.create_dir_all(parent)?;
        }
    }

    let invocation = backend.build_invocation(&unit.source, &unit.destination);
    info!(
        backend = %backend.name(),
        source = ?unit.source,
        destination = ?unit.destination,
        "compiling"
    );

    let status = runner.run(&invocation).await?;
    if !status.success {
        return Err(CivetError::CompileFailed {
            path: unit.source.clone(),
            code: status.code,
        });
    }

    backend.post_process(fs, &unit.source, &unit.destination)?;
    Ok(CompileOutcome::Compiled)
}

/// Compile `units` strictly in order, stopping at the first failure.
///
/// Units after a failed one are never attempted.
pub async fn compile_all(
    backend: &dyn CompilerBackend,
    units: &[CompileUnit],
    fs: &dyn FileSystem,
    runner: &dyn CommandRunner,
) -> Result<BatchReport> {
    info!(backend = %backend.name(), units = units.len(), "start compiling");
    let started = Instant::now();

    let mut report = BatchReport::default();
    for unit in units {
        match compile_one(backend, unit, fs, runner).await {
            Ok(outcome) => report.record(outcome),
            Err(err) => {
                error!(
                    backend = %backend.name(),
                    source = ?unit.source,
                    "batch aborted: {}",
                    err
                );
                return Err(err);
            }
        }
    }

    info!(
        backend = %backend.name(),
        compiled = report.compiled,
        skipped = report.skipped,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "end compiling"
    );
    Ok(report)
}
