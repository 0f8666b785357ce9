use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use civet::errors::Result;
use civet::exec::{CommandRunner, Invocation, RunStatus};
use civet::fs::FileSystem;

/// A fake command runner that:
/// - records every invocation it is asked to run
/// - fails (exit code 1) for invocations mentioning a source registered
///   with [`FakeRunner::fail_on`]
/// - otherwise "compiles" by writing the invocation's last argument (the
///   destination, for [`crate::FakeBackend`] and the Sass backend) through
///   the filesystem seam.
#[derive(Debug, Clone)]
pub struct FakeRunner {
    fs: Option<Arc<dyn FileSystem>>,
    calls: Arc<Mutex<Vec<Invocation>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl FakeRunner {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs: Some(fs),
            calls: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Record and succeed, but never write anything.
    pub fn without_outputs() -> Self {
        Self {
            fs: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn fail_on(&self, source: impl AsRef<Path>) {
        self.failing
            .lock()
            .unwrap()
            .insert(source.as_ref().to_string_lossy().into_owned());
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Source path (second-to-last argument) of every recorded invocation.
    pub fn compiled_sources(&self) -> Vec<PathBuf> {
        self.calls()
            .iter()
            .filter_map(|inv| inv.args.iter().rev().nth(1).map(PathBuf::from))
            .collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<RunStatus>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(invocation.clone());

            let fails = {
                let failing = self.failing.lock().unwrap();
                invocation.args.iter().any(|a| failing.contains(a))
            };
            if fails {
                return Ok(RunStatus::failed(1));
            }

            if let (Some(fs), Some(dst)) = (&self.fs, invocation.args.last()) {
                fs.write(Path::new(dst), format!("// built by {}", invocation).as_bytes())?;
            }
            Ok(RunStatus::success())
        })
    }
}
