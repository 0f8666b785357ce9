// src/lib.rs

pub mod backend;
pub mod cli;
pub mod compile;
pub mod config;
pub mod discover;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod mapping;
pub mod pipeline;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use crate::backend::build_backends;
use crate::cli::CliArgs;
use crate::config::{load_settings, Settings};
use crate::discover::SourceFinder;
use crate::exec::{CommandRunner, ProcessRunner};
use crate::fs::{FileSystem, RealFileSystem};
use crate::mapping::{classify, BackendUnits};
use crate::pipeline::{Pipeline, StartupOutcome};
use crate::watch::{plan_watches, WatchMode};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and backend resolution
/// - source discovery
/// - the initial batch compile
/// - (unless `--once`) the watch orchestrator, stopped on Ctrl-C
///
/// A failed initial batch is returned as an error; `main` turns that into
/// exit code 1.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let settings = load_settings(&config_path)?;
    debug!(?settings, "settings loaded");

    let sources = SourceFinder::from_settings(&settings)?.find()?;
    info!(files = sources.len(), "sources discovered");

    if args.dry_run {
        let backends = build_backends(&settings)?;
        let units = classify(&sources, &backends);
        print_dry_run(&settings, &units)?;
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::new());
    let pipeline = Pipeline::new(&settings, fs, runner)?;

    let units = pipeline.classify(&sources);
    let precompiled = match pipeline.precompile(units).await {
        StartupOutcome::Ready(precompiled) => precompiled,
        StartupOutcome::Fatal { message } => bail!(message),
    };

    if args.once {
        return Ok(());
    }

    let mut orchestrator = pipeline.orchestrator(precompiled)?;
    orchestrator.start()?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl+C: {e}");
    }
    info!("shutdown requested");
    orchestrator.stop().await;

    Ok(())
}

/// Print the compile units and watch plan without running anything.
fn print_dry_run(settings: &Settings, units: &[BackendUnits]) -> Result<()> {
    println!("civet dry-run");
    println!("  dest_root = {}", settings.dest_root.display());
    println!("  on_mapping_conflict = {:?}", settings.on_mapping_conflict);
    println!();

    for entry in units {
        println!("{} ({} units):", entry.backend.name(), entry.units.len());
        for unit in &entry.units {
            println!(
                "  - {} -> {}",
                unit.source.display(),
                unit.destination.display()
            );
        }
    }
    println!();

    println!("watches:");
    for plan in plan_watches(units, settings.on_mapping_conflict)? {
        match &plan.mode {
            WatchMode::Native(invocation) => {
                println!("  {}: native `{}`", plan.backend.name(), invocation);
            }
            WatchMode::Events(registrations) => {
                for reg in registrations {
                    println!(
                        "  {}: {}{}",
                        plan.backend.name(),
                        reg.directory.display(),
                        if reg.recursive { " (recursive)" } else { "" }
                    );
                }
            }
        }
    }

    debug!("dry-run complete (nothing compiled)");
    Ok(())
}
