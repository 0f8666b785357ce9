// tests/orchestrator_lifecycle.rs

mod common;
use crate::common::{init_tracing, mock_env, shared, with_timeout, FakeBackend, FakeRunner, TestResult};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use civet::exec::{CommandRunner, Invocation};
use civet::fs::{FileSystem, RealFileSystem};
use civet::pipeline::{Pipeline, StartupOutcome};
use civet::types::{MappingConflictPolicy, SourceFile};
use civet::watch::{OrchestratorState, WatchMode, WatchOrchestrator};

struct Project {
    _tmp: tempfile::TempDir,
    js: PathBuf,
    out: PathBuf,
    runner: FakeRunner,
    pipeline: Pipeline,
}

/// A real project on disk: `static/js/app.coffee`, output under `out/`.
fn project() -> std::io::Result<Project> {
    let tmp = tempfile::tempdir()?;
    let root = tmp.path().canonicalize()?;
    let js = root.join("static/js");
    let out = root.join("out");
    std::fs::create_dir_all(&js)?;
    std::fs::write(js.join("app.coffee"), "x = 1")?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let runner = FakeRunner::new(fs.clone());
    let shared_runner: Arc<dyn CommandRunner> = Arc::new(runner.clone());
    let pipeline = Pipeline::with_backends(
        vec![shared(FakeBackend::coffee(&out))],
        fs,
        shared_runner,
        MappingConflictPolicy::LastWins,
    );

    Ok(Project {
        _tmp: tmp,
        js,
        out,
        runner,
        pipeline,
    })
}

async fn started(project: &Project) -> Result<WatchOrchestrator, Box<dyn std::error::Error>> {
    let units = project.pipeline.classify(&[SourceFile::new(
        "js/app.coffee",
        project.js.join("app.coffee"),
    )]);
    let StartupOutcome::Ready(precompiled) = project.pipeline.precompile(units).await else {
        return Err("initial batch failed".into());
    };
    let mut orchestrator = project.pipeline.orchestrator(precompiled)?;
    orchestrator.start()?;
    Ok(orchestrator)
}

async fn wait_for(path: &Path) {
    while !path.exists() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Initial batch, then a new file in a watched directory gets compiled.
#[tokio::test]
async fn new_file_is_compiled_while_watching() -> TestResult {
    init_tracing();
    let project = project()?;
    let mut orchestrator = started(&project).await?;

    assert_eq!(orchestrator.state(), OrchestratorState::Watching);
    assert!(project.out.join("js/app.js").exists());

    std::fs::write(project.js.join("new.coffee"), "y = 2")?;
    with_timeout(wait_for(&project.out.join("js/new.js"))).await;

    orchestrator.stop().await;
    assert_eq!(orchestrator.state(), OrchestratorState::Stopped);
    Ok(())
}

/// Once stopped, filesystem changes no longer trigger compiles.
#[tokio::test]
async fn nothing_is_compiled_after_stop() -> TestResult {
    init_tracing();
    let project = project()?;
    let mut orchestrator = started(&project).await?;
    with_timeout(orchestrator.stop()).await;

    let calls = project.runner.call_count();
    std::fs::write(project.js.join("late.coffee"), "z = 3")?;
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(project.runner.call_count(), calls);
    assert!(!project.out.join("js/late.js").exists());
    Ok(())
}

#[tokio::test]
async fn start_twice_is_rejected() -> TestResult {
    let project = project()?;
    let mut orchestrator = started(&project).await?;

    assert!(orchestrator.start().is_err());
    assert_eq!(orchestrator.state(), OrchestratorState::Watching);

    orchestrator.stop().await;
    assert!(orchestrator.start().is_err());
    Ok(())
}

#[tokio::test]
async fn stop_is_idempotent() -> TestResult {
    let project = project()?;
    let mut orchestrator = started(&project).await?;

    orchestrator.stop().await;
    orchestrator.stop().await;
    assert_eq!(orchestrator.state(), OrchestratorState::Stopped);
    Ok(())
}

/// Watching a directory that does not exist fails registration and leaves
/// the orchestrator stopped.
#[tokio::test]
async fn failed_registration_stops_orchestrator() -> TestResult {
    init_tracing();
    let (mock, fs, runner) = mock_env();
    mock.add_file("/civet-test-missing/js/a.coffee", "");

    let pipeline = Pipeline::with_backends(
        vec![shared(FakeBackend::coffee("/civet-test-missing-out"))],
        fs,
        Arc::new(runner),
        MappingConflictPolicy::LastWins,
    );
    let units = pipeline.classify(&[SourceFile::new(
        "js/a.coffee",
        "/civet-test-missing/js/a.coffee",
    )]);
    let StartupOutcome::Ready(precompiled) = pipeline.precompile(units).await else {
        panic!("expected Ready");
    };

    let mut orchestrator = pipeline.orchestrator(precompiled)?;
    assert!(orchestrator.start().is_err());
    assert_eq!(orchestrator.state(), OrchestratorState::Stopped);
    Ok(())
}

/// A backend with its own watch mode gets a long-lived process instead of
/// file watches; stopping kills it promptly.
#[cfg(unix)]
#[tokio::test]
async fn native_watch_process_is_killed_on_stop() -> TestResult {
    init_tracing();
    let (mock, fs, runner) = mock_env();
    mock.add_file("/p/css/site.scss", "");

    let backend = FakeBackend::scss("/out").with_native_watch(Invocation::new("sleep").arg("30"));
    let pipeline = Pipeline::with_backends(
        vec![shared(backend)],
        fs,
        Arc::new(runner),
        MappingConflictPolicy::LastWins,
    );
    let units = pipeline.classify(&[SourceFile::new("css/site.scss", "/p/css/site.scss")]);
    let StartupOutcome::Ready(precompiled) = pipeline.precompile(units).await else {
        panic!("expected Ready");
    };

    let mut orchestrator = pipeline.orchestrator(precompiled)?;
    assert!(matches!(orchestrator.plans()[0].mode, WatchMode::Native(_)));

    orchestrator.start()?;
    assert_eq!(orchestrator.state(), OrchestratorState::Watching);

    with_timeout(orchestrator.stop()).await;
    assert_eq!(orchestrator.state(), OrchestratorState::Stopped);
    Ok(())
}
