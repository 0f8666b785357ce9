// src/watch/mod.rs

//! File watching and incremental recompilation.
//!
//! This module is responsible for:
//! - Reducing each backend's source directories to a minimal set of
//!   top-most directories (`reduce.rs`).
//! - Narrowing raw `notify` events to the four kinds civet reacts to
//!   (`event.rs`).
//! - Deciding, per event, whether to ignore, warn or compile (`dispatch.rs`).
//! - Owning the lifecycle of every backend's watch context
//!   (`orchestrator.rs`).
//!
//! New directories are not picked up while watching; the watched set is
//! fixed when the orchestrator starts.

pub mod dispatch;
pub mod event;
pub mod orchestrator;
pub mod reduce;

pub use dispatch::{
    plan_event, DirectoryAction, EventDispatcher, EventOutcome, EventPlan, WatchWarning,
};
pub use event::{FsEvent, RenamePairer};
pub use orchestrator::{
    plan_watches, OrchestratorState, WatchMode, WatchOrchestrator, WatchPlan, WatchRegistration,
};
pub use reduce::reduce_directories;
