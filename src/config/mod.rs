// src/config/mod.rs

//! Configuration loading and validation for civet.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants (`validate.rs`).
//! - Resolve the result into the explicit [`Settings`] value the rest of the
//!   crate is constructed from (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_settings};
pub use model::{BackendSection, ConfigFile, ConfigSection, RawConfigFile};
pub use settings::{DEFAULT_IGNORE_PATTERNS, Settings};
