// tests/compile_engine.rs

mod common;
use crate::common::{init_tracing, mock_env, FakeBackend, FakeRunner, TestResult};

use civet::compile::{compile_all, compile_one, is_up_to_date, BatchReport, CompileOutcome};
use civet::errors::CivetError;
use civet::fs::FileSystem;
use civet::types::{BackendKind, CompileUnit};

fn unit(src: &str, dst: &str) -> CompileUnit {
    CompileUnit::new(src, dst, BackendKind::CoffeeScript)
}

/// A destination newer than its source is left alone and nothing is spawned.
#[tokio::test]
async fn up_to_date_destination_is_skipped() -> TestResult {
    init_tracing();
    let (mock, fs, runner) = mock_env();
    let backend = FakeBackend::coffee("/out");

    mock.add_file("/src/app.coffee", "x = 1");
    mock.add_file("/out/app.js", "var x = 1;");
    let before = mock.mtime_tick("/out/app.js");

    let u = unit("/src/app.coffee", "/out/app.js");
    let outcome = compile_one(&backend, &u, fs.as_ref(), &runner).await?;

    assert_eq!(outcome, CompileOutcome::Skipped);
    assert_eq!(runner.call_count(), 0);
    assert!(fs.exists(&u.destination));
    assert_eq!(mock.mtime_tick("/out/app.js"), before);
    Ok(())
}

/// Equal mtimes count as up to date.
#[tokio::test]
async fn equal_mtimes_are_up_to_date() -> TestResult {
    let (mock, fs, _runner) = mock_env();
    mock.add_file("/src/a.coffee", "");
    mock.add_file("/out/a.js", "");
    mock.set_mtime("/src/a.coffee", 7);
    mock.set_mtime("/out/a.js", 7);

    assert!(is_up_to_date(fs.as_ref(), &unit("/src/a.coffee", "/out/a.js"))?);
    Ok(())
}

/// A missing destination is compiled once, and afterwards it is newer than
/// its source.
#[tokio::test]
async fn missing_destination_is_compiled_once() -> TestResult {
    init_tracing();
    let (mock, fs, runner) = mock_env();
    let backend = FakeBackend::coffee("/out");
    mock.add_file("/src/app.coffee", "x = 1");

    let u = unit("/src/app.coffee", "/out/js/app.js");
    let outcome = compile_one(&backend, &u, fs.as_ref(), &runner).await?;

    assert_eq!(outcome, CompileOutcome::Compiled);
    assert_eq!(runner.call_count(), 1);
    assert!(fs.is_dir(std::path::Path::new("/out/js")));
    let src = mock.mtime_tick("/src/app.coffee").unwrap();
    let dst = mock.mtime_tick("/out/js/app.js").unwrap();
    assert!(dst >= src);
    Ok(())
}

/// A stale destination is deleted before the compiler runs; if that compile
/// fails, the destination stays absent.
#[tokio::test]
async fn failed_compile_leaves_no_stale_artifact() -> TestResult {
    init_tracing();
    let (mock, fs, runner) = mock_env();
    let backend = FakeBackend::coffee("/out");

    mock.add_file("/out/app.js", "old");
    mock.add_file("/src/app.coffee", "x = (");
    runner.fail_on("/src/app.coffee");

    let u = unit("/src/app.coffee", "/out/app.js");
    let err = compile_one(&backend, &u, fs.as_ref(), &runner)
        .await
        .unwrap_err();

    match err {
        CivetError::CompileFailed { path, code } => {
            assert_eq!(path, u.source);
            assert_eq!(code, Some(1));
        }
        other => panic!("expected CompileFailed, got {other:?}"),
    }
    assert!(!fs.exists(&u.destination));
    Ok(())
}

/// Two identical modifications of an unchanged, already-built source: both
/// skip, and no process is spawned either time.
#[tokio::test]
async fn repeated_checks_on_unchanged_source_spawn_nothing() -> TestResult {
    let (mock, fs, runner) = mock_env();
    let backend = FakeBackend::coffee("/out");
    mock.add_file("/src/app.coffee", "x = 1");

    let u = unit("/src/app.coffee", "/out/app.js");
    compile_one(&backend, &u, fs.as_ref(), &runner).await?;
    assert_eq!(runner.call_count(), 1);

    for _ in 0..2 {
        let outcome = compile_one(&backend, &u, fs.as_ref(), &runner).await?;
        assert_eq!(outcome, CompileOutcome::Skipped);
    }
    assert_eq!(runner.call_count(), 1);
    Ok(())
}

/// Touching the source makes the artifact stale again.
#[tokio::test]
async fn touched_source_is_recompiled() -> TestResult {
    let (mock, fs, runner) = mock_env();
    let backend = FakeBackend::coffee("/out");
    mock.add_file("/src/app.coffee", "x = 1");
    let u = unit("/src/app.coffee", "/out/app.js");

    compile_one(&backend, &u, fs.as_ref(), &runner).await?;
    mock.touch("/src/app.coffee");
    let outcome = compile_one(&backend, &u, fs.as_ref(), &runner).await?;

    assert_eq!(outcome, CompileOutcome::Compiled);
    assert_eq!(runner.call_count(), 2);
    Ok(())
}

/// `[ok, fails, ok]`: the first compiles, the second is attempted and
/// fails, the third is never attempted.
#[tokio::test]
async fn batch_is_fail_fast() -> TestResult {
    init_tracing();
    let (mock, fs, runner) = mock_env();
    let backend = FakeBackend::coffee("/out");

    for name in ["u1", "u2", "u3"] {
        mock.add_file(format!("/src/{name}.coffee"), "");
    }
    runner.fail_on("/src/u2.coffee");

    let units = vec![
        unit("/src/u1.coffee", "/out/u1.js"),
        unit("/src/u2.coffee", "/out/u2.js"),
        unit("/src/u3.coffee", "/out/u3.js"),
    ];
    let result = compile_all(&backend, &units, fs.as_ref(), &runner).await;

    assert!(matches!(result, Err(CivetError::CompileFailed { .. })));
    assert_eq!(
        runner.compiled_sources(),
        vec![
            std::path::PathBuf::from("/src/u1.coffee"),
            std::path::PathBuf::from("/src/u2.coffee"),
        ]
    );
    assert!(fs.exists(&units[0].destination));
    assert!(!fs.exists(&units[2].destination));
    Ok(())
}

/// The batch report counts compiled and skipped units separately.
#[tokio::test]
async fn batch_reports_compiled_and_skipped() -> TestResult {
    let (mock, fs, runner) = mock_env();
    let backend = FakeBackend::coffee("/out");

    mock.add_file("/src/a.coffee", "");
    mock.add_file("/out/a.js", "");
    mock.add_file("/src/b.coffee", "");

    let units = vec![
        unit("/src/a.coffee", "/out/a.js"),
        unit("/src/b.coffee", "/out/b.js"),
    ];
    let report = compile_all(&backend, &units, fs.as_ref(), &runner).await?;

    assert_eq!(
        report,
        BatchReport {
            compiled: 1,
            skipped: 1
        }
    );
    assert_eq!(report.total(), 2);
    Ok(())
}

/// A source that vanished before its compile is an error, not a panic.
#[tokio::test]
async fn missing_source_with_existing_destination_is_an_error() -> TestResult {
    let (mock, fs, _runner) = mock_env();
    let runner = FakeRunner::without_outputs();
    let backend = FakeBackend::coffee("/out");
    mock.add_file("/out/gone.js", "");

    let u = unit("/src/gone.coffee", "/out/gone.js");
    let result = compile_one(&backend, &u, fs.as_ref(), &runner).await;

    assert!(result.is_err());
    assert_eq!(runner.call_count(), 0);
    Ok(())
}

/// Same rule against real files, with mtimes pinned through `filetime`.
#[test]
fn real_files_follow_mtime_ordering() -> TestResult {
    use civet::fs::RealFileSystem;
    use filetime::{set_file_mtime, FileTime};

    let dir = tempfile::tempdir()?;
    let src = dir.path().join("app.coffee");
    let dst = dir.path().join("app.js");
    std::fs::write(&src, "x = 1")?;
    std::fs::write(&dst, "var x = 1;")?;
    let u = CompileUnit::new(&src, &dst, BackendKind::CoffeeScript);

    set_file_mtime(&src, FileTime::from_unix_time(1_000, 0))?;
    set_file_mtime(&dst, FileTime::from_unix_time(2_000, 0))?;
    assert!(is_up_to_date(&RealFileSystem, &u)?);

    set_file_mtime(&src, FileTime::from_unix_time(3_000, 0))?;
    assert!(!is_up_to_date(&RealFileSystem, &u)?);

    std::fs::remove_file(&dst)?;
    assert!(!is_up_to_date(&RealFileSystem, &u)?);
    Ok(())
}
