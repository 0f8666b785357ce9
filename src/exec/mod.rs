// src/exec/mod.rs

//! Process execution layer.
//!
//! Everything that actually spawns an external compiler goes through here,
//! using `tokio::process::Command`.
//!
//! - [`runner`] provides the `CommandRunner` trait and the production
//!   `ProcessRunner`. Tests swap in a fake runner that never spawns anything.
//! - [`native`] runs a backend's own long-lived watch process (e.g.
//!   `sass --watch`) and tears it down on shutdown.

pub mod native;
pub mod runner;

use std::fmt;
use std::path::PathBuf;

pub use native::NativeWatcher;
pub use runner::{CommandRunner, ProcessRunner, RunStatus};

/// A fully-built external process invocation.
///
/// Building one never executes anything; it is plain data until handed to a
/// [`CommandRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Extra environment variables for the child.
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub(crate) fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
