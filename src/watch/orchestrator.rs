// src/watch/orchestrator.rs

//! Watch orchestrator: lifecycle of every backend's watch context.
//!
//! `Idle -> Registering -> Watching -> Stopped`. An orchestrator can only be
//! built from a [`Precompiled`] token, which only a successful initial batch
//! hands out, so nothing is ever watched before the batch has finished.
//!
//! Per backend, one of two things runs:
//! - a native watch process, for backends whose tool has a watch mode of its
//!   own (`sass --watch`);
//! - otherwise a `notify` watcher over the reduced source directories,
//!   feeding a dispatch task that handles events one at a time.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::SharedBackend;
use crate::errors::{CivetError, Result};
use crate::exec::{CommandRunner, Invocation, NativeWatcher};
use crate::fs::FileSystem;
use crate::mapping::{BackendUnits, DirectoryMapping};
use crate::pipeline::Precompiled;
use crate::types::MappingConflictPolicy;
use crate::watch::dispatch::EventDispatcher;
use crate::watch::event::RenamePairer;

/// How long the `To` half of a rename waits for its paired `Both` event.
const RENAME_PAIR_WINDOW: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    Registering,
    Watching,
    Stopped,
}

/// One directory handed to the OS notification mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRegistration {
    pub directory: PathBuf,
    pub recursive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchMode {
    /// The backend's own long-lived watch process.
    Native(Invocation),
    /// Filesystem notifications dispatched to per-file compiles.
    Events(Vec<WatchRegistration>),
}

/// What will be watched for one backend.
#[derive(Debug, Clone)]
pub struct WatchPlan {
    pub backend: SharedBackend,
    pub mapping: Arc<DirectoryMapping>,
    pub mode: WatchMode,
}

/// Build the watch plan for every backend that has something to watch.
///
/// Event-mode registrations are recursive and cover the reduced directory
/// set, so no registered directory is a descendant of another.
pub fn plan_watches(
    units: &[BackendUnits],
    policy: MappingConflictPolicy,
) -> Result<Vec<WatchPlan>> {
    let mut plans = Vec::new();

    for entry in units {
        let mapping = DirectoryMapping::from_units(&entry.units, policy)?;
        if mapping.is_empty() {
            debug!(backend = %entry.backend.name(), "nothing to watch");
            continue;
        }

        let mode = match entry.backend.native_watch(&mapping) {
            Some(invocation) => WatchMode::Native(invocation),
            None => WatchMode::Events(
                mapping
                    .reduced_source_dirs()
                    .into_iter()
                    .map(|directory| WatchRegistration {
                        directory,
                        recursive: true,
                    })
                    .collect(),
            ),
        };

        plans.push(WatchPlan {
            backend: entry.backend.clone(),
            mapping: Arc::new(mapping),
            mode,
        });
    }

    Ok(plans)
}

enum RunningContext {
    Native(NativeWatcher),
    Events {
        backend: String,
        watcher: RecommendedWatcher,
        task: JoinHandle<()>,
    },
}

pub struct WatchOrchestrator {
    state: OrchestratorState,
    backends: Vec<SharedBackend>,
    plans: Vec<WatchPlan>,
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn CommandRunner>,
    shutdown: watch::Sender<bool>,
    running: Vec<RunningContext>,
}

impl fmt::Debug for WatchOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchOrchestrator")
            .field("state", &self.state)
            .field("plans", &self.plans)
            .field("running", &self.running.len())
            .finish()
    }
}

impl WatchOrchestrator {
    /// Build an idle orchestrator from the result of a successful batch.
    ///
    /// Directory mappings are derived here; with
    /// [`MappingConflictPolicy::Fail`] a conflicting mapping is an error and
    /// nothing gets registered.
    pub fn new(
        precompiled: Precompiled,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
        policy: MappingConflictPolicy,
    ) -> Result<Self> {
        let units = precompiled.into_units();
        let plans = plan_watches(&units, policy)?;
        let backends = units.into_iter().map(|u| u.backend).collect();
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            state: OrchestratorState::Idle,
            backends,
            plans,
            fs,
            runner,
            shutdown,
            running: Vec::new(),
        })
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn plans(&self) -> &[WatchPlan] {
        &self.plans
    }

    /// Register every watch and start the watch contexts.
    ///
    /// Must be called from within a Tokio runtime. If any registration
    /// fails, everything registered so far is released and the orchestrator
    /// ends up `Stopped`.
    pub fn start(&mut self) -> Result<()> {
        if self.state != OrchestratorState::Idle {
            return Err(CivetError::Other(anyhow!(
                "watch orchestrator cannot start from state {:?}",
                self.state
            )));
        }
        self.state = OrchestratorState::Registering;

        for plan in &self.plans {
            let others: Vec<SharedBackend> = self
                .backends
                .iter()
                .filter(|b| !Arc::ptr_eq(b, &plan.backend))
                .cloned()
                .collect();

            let registered = match &plan.mode {
                WatchMode::Native(invocation) => {
                    NativeWatcher::spawn(plan.backend.name(), invocation).map(RunningContext::Native)
                }
                WatchMode::Events(registrations) => {
                    let dispatcher = EventDispatcher::new(
                        plan.backend.clone(),
                        others,
                        plan.mapping.clone(),
                        self.fs.clone(),
                        self.runner.clone(),
                    );
                    register_events(dispatcher, registrations, self.shutdown.subscribe())
                }
            };

            match registered {
                Ok(context) => self.running.push(context),
                Err(err) => {
                    warn!(backend = %plan.backend.name(), "watch registration failed: {}", err);
                    self.shutdown.send_replace(true);
                    self.running.clear();
                    self.state = OrchestratorState::Stopped;
                    return Err(err);
                }
            }
        }

        self.state = OrchestratorState::Watching;
        info!(contexts = self.running.len(), "watching for changes");
        Ok(())
    }

    /// Release every watch, kill native watch processes and join every
    /// dispatch task.
    ///
    /// A compile already in flight runs to completion; no new one starts.
    pub async fn stop(&mut self) {
        if self.state == OrchestratorState::Stopped {
            return;
        }
        self.shutdown.send_replace(true);

        for context in std::mem::take(&mut self.running) {
            match context {
                RunningContext::Native(mut native) => native.stop().await,
                RunningContext::Events {
                    backend,
                    watcher,
                    task,
                } => {
                    drop(watcher);
                    if let Err(e) = task.await {
                        warn!(backend = %backend, error = %e, "dispatch task failed");
                    }
                }
            }
        }

        self.state = OrchestratorState::Stopped;
        info!("watching stopped");
    }
}

impl Drop for WatchOrchestrator {
    fn drop(&mut self) {
        if self.state == OrchestratorState::Stopped {
            return;
        }
        // Dropping the contexts releases OS watches and kills native
        // children; dispatch tasks exit on the shutdown flag.
        self.shutdown.send_replace(true);
        self.running.clear();
        self.state = OrchestratorState::Stopped;
    }
}

fn register_events(
    dispatcher: EventDispatcher,
    registrations: &[WatchRegistration],
    shutdown: watch::Receiver<bool>,
) -> Result<RunningContext> {
    let backend = dispatcher.backend().name().to_string();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    // Called synchronously on notify's own thread.
    let mut watcher = RecommendedWatcher::new(
        {
            let backend = backend.clone();
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event_tx.send(event).is_err() {
                        debug!(backend = %backend, "dispatch loop gone; dropping event");
                    }
                }
                Err(err) => warn!(backend = %backend, "file watch error: {}", err),
            }
        },
        Config::default(),
    )?;

    for registration in registrations {
        let mode = if registration.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(&registration.directory, mode)?;
        debug!(backend = %backend, directory = ?registration.directory, "watch registered");
    }

    info!(
        backend = %backend,
        directories = registrations.len(),
        "file watcher started"
    );

    let task = tokio::spawn(dispatch_loop(dispatcher, event_rx, shutdown));

    Ok(RunningContext::Events {
        backend,
        watcher,
        task,
    })
}

async fn dispatch_loop(
    dispatcher: EventDispatcher,
    mut events: mpsc::UnboundedReceiver<Event>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut renames = RenamePairer::new();

    loop {
        let ready = tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }

            received = events.recv() => {
                let Some(raw) = received else { break };
                debug!(?raw, "received notify event");
                renames.push(raw)
            }

            _ = tokio::time::sleep(RENAME_PAIR_WINDOW), if renames.has_pending() => {
                renames.flush()
            }
        };

        for event in ready {
            if *shutdown.borrow() {
                debug!("shutdown observed; not starting new compiles");
                return;
            }
            dispatcher.handle(&event).await;
        }
    }
    debug!(backend = %dispatcher.backend().name(), "dispatch loop finished");
}
