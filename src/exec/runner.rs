// src/exec/runner.rs

//! Pluggable command runner abstraction.
//!
//! The compile engine talks to a `CommandRunner` instead of spawning
//! processes itself. Production code uses [`ProcessRunner`]; tests provide
//! their own implementation that records invocations and fakes outputs.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::errors::Result;

use super::Invocation;

/// Outcome of one finished external process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
}

impl RunStatus {
    pub fn success() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    pub fn failed(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
        }
    }
}

/// Trait abstracting how an external compiler invocation is run.
///
/// The returned future resolves once the process has exited; callers await
/// it, so a single compile is blocking with respect to whoever issued it.
pub trait CommandRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<RunStatus>> + Send + 'a>>;
}

/// Real runner used in production.
///
/// The child's stderr is forwarded line by line at `warn` level (that is
/// where the compilers report syntax errors); stdout goes to `debug`.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<RunStatus>> + Send + 'a>> {
        Box::pin(async move {
            let mut cmd = invocation.to_command();
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            debug!(cmd = %invocation, "spawning compiler process");

            let mut child = cmd
                .spawn()
                .with_context(|| format!("spawning `{}`", invocation))?;

            let program = invocation.program.display().to_string();

            let stdout_task = child.stdout.take().map(|stdout| {
                let program = program.clone();
                tokio::spawn(async move {
                    let mut lines = BufReader::new(stdout).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        debug!(program = %program, "stdout: {}", line);
                    }
                })
            });

            let stderr_task = child.stderr.take().map(|stderr| {
                let program = program.clone();
                tokio::spawn(async move {
                    let mut lines = BufReader::new(stderr).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        warn!(program = %program, "{}", line);
                    }
                })
            });

            let status = child
                .wait()
                .await
                .with_context(|| format!("waiting for `{}`", invocation))?;

            // Drain the pipes so diagnostics are logged before we report back.
            for task in [stdout_task, stderr_task].into_iter().flatten() {
                let _ = task.await;
            }

            info!(
                program = %program,
                exit_code = ?status.code(),
                success = status.success(),
                "compiler process exited"
            );

            Ok(RunStatus {
                success: status.success(),
                code: status.code(),
            })
        })
    }
}
