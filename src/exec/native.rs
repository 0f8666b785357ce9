// src/exec/native.rs

//! Backend-owned long-lived watch processes.

use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::Result;

use super::Invocation;

/// Handle for a running native watch process (e.g. `sass --watch`).
///
/// - `cancel` asks the supervising task to kill the child.
/// - `handle` is the Tokio task supervising the child.
///
/// Dropping the handle without calling [`NativeWatcher::stop`] still kills
/// the child: the supervising task sees the cancel channel close, and the
/// child is spawned with `kill_on_drop(true)`.
#[derive(Debug)]
pub struct NativeWatcher {
    backend: String,
    cancel: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl NativeWatcher {
    /// Spawn the watch process and its supervising task.
    pub fn spawn(backend: &str, invocation: &Invocation) -> Result<Self> {
        let mut cmd = invocation.to_command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning native watcher `{}`", invocation))?;

        info!(backend = %backend, cmd = %invocation, "native watch process started");

        forward_output(backend, &mut child);

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let name = backend.to_string();
        let handle = tokio::spawn(async move {
            supervise(name, child, cancel_rx).await;
        });

        Ok(Self {
            backend: backend.to_string(),
            cancel: Some(cancel_tx),
            handle: Some(handle),
        })
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Kill the child (if still running) and wait for the supervisor to end.
    pub async fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            if cancel.send(()).is_err() {
                debug!(backend = %self.backend, "native watcher already finished while stopping");
            }
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(backend = %self.backend, error = %e, "native watcher task failed");
            }
        }
    }
}

fn forward_output(backend: &str, child: &mut Child) {
    if let Some(stdout) = child.stdout.take() {
        let name = backend.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(backend = %name, "{}", line);
            }
        });
    }
    if let Some(stderr) = child.stderr.take() {
        let name = backend.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!(backend = %name, "{}", line);
            }
        });
    }
}

async fn supervise(backend: String, mut child: Child, mut cancel_rx: oneshot::Receiver<()>) {
    tokio::select! {
        status = child.wait() => {
            match status {
                Ok(status) => warn!(
                    backend = %backend,
                    exit_code = ?status.code(),
                    "native watch process exited on its own; changes are no longer compiled"
                ),
                Err(e) => warn!(backend = %backend, error = %e, "failed waiting for native watch process"),
            }
        }

        cancel = &mut cancel_rx => {
            if cancel.is_err() {
                debug!(backend = %backend, "native watcher handle dropped; killing process");
            } else {
                info!(backend = %backend, "stopping native watch process");
            }
            if let Err(e) = child.kill().await {
                warn!(backend = %backend, error = %e, "failed to kill native watch process");
            }
        }
    }
}
