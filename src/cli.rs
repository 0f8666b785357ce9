// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `civet`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "civet",
    version,
    about = "Compile CoffeeScript, ES6 and Sass assets, then keep them in sync while you edit.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Civet.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Civet.toml")]
    pub config: String,

    /// Compile everything that is missing or stale, then exit.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CIVET_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve backends and print what would be compiled and watched, but
    /// don't run any compiler.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
