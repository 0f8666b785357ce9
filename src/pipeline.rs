// src/pipeline.rs

//! The boundary between the build core and whoever hosts it.
//!
//! A host builds a [`Pipeline`], hands it the discovered sources, runs the
//! initial batch with [`Pipeline::precompile`] and, if that came back
//! [`StartupOutcome::Ready`], turns the [`Precompiled`] token into a
//! [`WatchOrchestrator`]. The core never exits the process; a failed batch is
//! reported as [`StartupOutcome::Fatal`] and the host decides what happens.

use std::sync::Arc;

use tracing::{error, info};

use crate::backend::{build_backends, SharedBackend};
use crate::compile::{compile_all, BatchReport};
use crate::config::Settings;
use crate::errors::Result;
use crate::exec::CommandRunner;
use crate::fs::FileSystem;
use crate::mapping::{classify, BackendUnits};
use crate::types::{MappingConflictPolicy, SourceFile};
use crate::watch::WatchOrchestrator;

/// Proof that the initial batch compile finished successfully.
///
/// Only [`Pipeline::precompile`] creates one.
#[derive(Debug)]
pub struct Precompiled {
    units: Vec<BackendUnits>,
    report: BatchReport,
}

impl Precompiled {
    pub fn units(&self) -> &[BackendUnits] {
        &self.units
    }

    /// Totals over every backend's batch.
    pub fn report(&self) -> BatchReport {
        self.report
    }

    pub(crate) fn into_units(self) -> Vec<BackendUnits> {
        self.units
    }
}

/// Result of the initial batch, as seen by the host.
#[derive(Debug)]
pub enum StartupOutcome {
    Ready(Precompiled),
    Fatal { message: String },
}

impl StartupOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, StartupOutcome::Ready(_))
    }
}

#[derive(Clone)]
pub struct Pipeline {
    backends: Vec<SharedBackend>,
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn CommandRunner>,
    policy: MappingConflictPolicy,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("backends", &self.backends)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Pipeline {
    /// Resolve every enabled backend and make sure the destination root
    /// exists.
    ///
    /// Fails with `BackendUnavailable` if an executable cannot be found.
    pub fn new(
        settings: &Settings,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self> {
        let backends = build_backends(settings)?;

        if !fs.is_dir(&settings.dest_root) {
            info!(dest_root = ?settings.dest_root, "creating destination root");
            fs.create_dir_all(&settings.dest_root)?;
        }

        Ok(Self::with_backends(
            backends,
            fs,
            runner,
            settings.on_mapping_conflict,
        ))
    }

    /// Assemble a pipeline from already-constructed backends.
    pub fn with_backends(
        backends: Vec<SharedBackend>,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
        policy: MappingConflictPolicy,
    ) -> Self {
        Self {
            backends,
            fs,
            runner,
            policy,
        }
    }

    pub fn backends(&self) -> &[SharedBackend] {
        &self.backends
    }

    pub fn classify(&self, sources: &[SourceFile]) -> Vec<BackendUnits> {
        classify(sources, &self.backends)
    }

    /// Run the initial batch: every backend in order, every unit in order,
    /// stopping at the first failure anywhere.
    pub async fn precompile(&self, units: Vec<BackendUnits>) -> StartupOutcome {
        let mut total = BatchReport::default();

        for entry in &units {
            if entry.units.is_empty() {
                continue;
            }
            match compile_all(
                entry.backend.as_ref(),
                &entry.units,
                self.fs.as_ref(),
                self.runner.as_ref(),
            )
            .await
            {
                Ok(report) => {
                    total.compiled += report.compiled;
                    total.skipped += report.skipped;
                }
                Err(err) => {
                    let message = format!("{} precompilation failed: {}", entry.backend.name(), err);
                    error!("{}", message);
                    return StartupOutcome::Fatal { message };
                }
            }
        }

        info!(
            compiled = total.compiled,
            skipped = total.skipped,
            "initial build finished"
        );
        StartupOutcome::Ready(Precompiled {
            units,
            report: total,
        })
    }

    /// Build the (idle) watch orchestrator for a finished batch.
    pub fn orchestrator(&self, precompiled: Precompiled) -> Result<WatchOrchestrator> {
        WatchOrchestrator::new(
            precompiled,
            self.fs.clone(),
            self.runner.clone(),
            self.policy,
        )
    }
}
