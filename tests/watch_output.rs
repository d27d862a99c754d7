// tests/watch_output.rs
mod common;
use crate::common::{init_tracing, millis, secs, sh, temp_harness, with_timeout, TestResult};

use std::time::{Duration, Instant};

use bgrun::errors::HarnessError;
use bgrun::exec::watcher::wait_for_line;
use bgrun::{Lifecycle, SignalSpec};

/// A line that is already in the buffer when the watch starts is found
/// well before the timeout.
#[tokio::test]
async fn matching_line_returns_before_timeout() -> TestResult {
    init_tracing();

    let mut harness = temp_harness();
    harness.launch("sh", sh("echo ready; echo working; exec sleep 30"))?;

    let limit = Duration::from_secs(3);
    let found = with_timeout(harness.wait_for_output("ready", Some(limit))).await?;

    assert_eq!(found.line, "ready");
    assert_eq!(found.line_number, 1);
    assert!(found.elapsed < limit, "match took {:?}", found.elapsed);

    harness.stop(None).await?;
    Ok(())
}

/// The watcher keeps following the buffer for lines written after it
/// started waiting.
#[tokio::test]
async fn waits_for_lines_written_later() -> TestResult {
    init_tracing();

    let mut harness = temp_harness();
    harness.launch(
        "sh",
        sh("echo booting; sleep 0.3; echo listening on 8080; exec sleep 30"),
    )?;

    let found = with_timeout(harness.wait_for_output("^listening on [0-9]+$", secs(3))).await?;
    assert_eq!(found.line, "listening on 8080");
    assert_eq!(found.line_number, 2);
    assert!(found.elapsed >= Duration::from_millis(200));

    harness.stop(None).await?;
    Ok(())
}

/// With no matching line the watch fails at about the timeout, reports the
/// pattern and everything written so far, and leaves the process running.
#[tokio::test]
async fn timeout_reports_output_and_leaves_process_alive() -> TestResult {
    init_tracing();

    let mut harness = temp_harness();
    harness.launch("sh", sh("echo one; echo two; exec sleep 30"))?;

    // Let both lines land so the error content is deterministic.
    harness.wait_for_output("^two$", secs(3)).await?;

    let started = Instant::now();
    let err = harness
        .wait_for_output("three", Some(Duration::from_secs(1)))
        .await
        .expect_err("no line matches 'three'");
    let elapsed = started.elapsed();

    match &err {
        HarnessError::WaitTimeout {
            pattern,
            timeout,
            output,
        } => {
            assert_eq!(pattern, "three");
            assert_eq!(*timeout, Duration::from_secs(1));
            assert_eq!(output, "one\ntwo\n");
        }
        other => panic!("expected WaitTimeout, got {:?}", other),
    }
    assert!(err.to_string().contains("three"));
    assert!(err.to_string().contains("one\ntwo"));
    assert!(elapsed >= Duration::from_millis(900), "returned after {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(2500), "returned after {:?}", elapsed);

    let process = harness.process_mut().expect("process still tracked");
    assert!(process.is_running(), "timeout must not affect the process");
    assert_eq!(harness.lifecycle(), Lifecycle::Launched);

    let outcome = harness.stop(None).await?.expect("process was running");
    assert_eq!(outcome.signal, Some(SignalSpec::TERM.number()));
    assert_eq!(outcome.status, 128 + SignalSpec::TERM.number());
    Ok(())
}

/// A process that prints nothing at all still times out cleanly and can be
/// stopped afterwards.
#[tokio::test]
async fn silent_process_times_out_then_stops() -> TestResult {
    init_tracing();

    let mut harness = temp_harness();
    harness.launch("sleep", ["30"])?;

    let started = Instant::now();
    let err = harness
        .wait_for_output("nope", secs(1))
        .await
        .expect_err("sleep prints nothing");
    assert!(matches!(err, HarnessError::WaitTimeout { ref output, .. } if output.is_empty()));
    assert!(started.elapsed() >= Duration::from_millis(900));

    let outcome = harness.stop(None).await?.expect("process was running");
    assert_eq!(outcome.status, 143);
    assert!(outcome.output.is_empty());
    assert!(outcome.lines.is_empty());
    Ok(())
}

#[tokio::test]
async fn without_process_fails_and_spawns_nothing() -> TestResult {
    init_tracing();

    let mut harness = temp_harness();
    let err = harness
        .wait_for_output("ready", secs(1))
        .await
        .expect_err("nothing launched");

    assert!(matches!(err, HarnessError::ProcessNotLaunched));
    assert!(err.is_precondition());
    assert_eq!(err.to_string(), "process not launched");
    assert_eq!(harness.lifecycle(), Lifecycle::NotStarted);
    assert!(!harness.capture_path().exists(), "no capture buffer should be created");
    Ok(())
}

#[tokio::test]
async fn empty_pattern_is_rejected() -> TestResult {
    init_tracing();

    let mut harness = temp_harness();
    harness.launch("sh", sh("echo ready; exec sleep 30"))?;

    let err = harness
        .wait_for_output("", secs(1))
        .await
        .expect_err("empty pattern");
    assert!(matches!(err, HarnessError::PatternNotSpecified));
    assert_eq!(err.to_string(), "pattern not specified");

    let process = harness.process_mut().expect("still launched");
    assert!(process.is_running());

    harness.stop(None).await?;
    Ok(())
}

#[tokio::test]
async fn invalid_regex_is_rejected() -> TestResult {
    init_tracing();

    let mut harness = temp_harness();
    harness.launch("sh", sh("exec sleep 30"))?;

    let err = harness
        .wait_for_output("([unclosed", secs(1))
        .await
        .expect_err("invalid regex");
    assert!(matches!(err, HarnessError::InvalidPattern { .. }));

    harness.stop(None).await?;
    Ok(())
}

/// Lines are evaluated in write order, so the first matching line wins.
#[tokio::test]
async fn first_matching_line_wins() -> TestResult {
    init_tracing();

    let mut harness = temp_harness();
    harness.launch(
        "sh",
        sh("printf 'skip\\nmatch-1\\nmatch-2\\nmatch-3\\n'; exec sleep 30"),
    )?;

    let found = with_timeout(harness.wait_for_output("^match-", secs(3))).await?;
    assert_eq!(found.line, "match-1");
    assert_eq!(found.line_number, 2);

    harness.stop(None).await?;
    Ok(())
}

/// A line written in pieces is only evaluated once its newline arrives.
#[tokio::test]
async fn partial_lines_are_joined_before_matching() -> TestResult {
    init_tracing();

    let mut harness = temp_harness();
    harness.launch(
        "sh",
        sh("printf 'rea'; sleep 0.3; printf 'dy\\n'; exec sleep 30"),
    )?;

    let found = with_timeout(harness.wait_for_output("^ready$", secs(3))).await?;
    assert_eq!(found.line, "ready");

    harness.stop(None).await?;
    Ok(())
}

#[tokio::test]
async fn stderr_is_captured_with_stdout() -> TestResult {
    init_tracing();

    let mut harness = temp_harness();
    harness.launch("sh", sh("echo 'oops on stderr' 1>&2; exec sleep 30"))?;

    let found = with_timeout(harness.wait_for_output("oops", secs(3))).await?;
    assert_eq!(found.line, "oops on stderr");

    let outcome = harness.stop(None).await?.expect("process was running");
    assert_eq!(outcome.lines, vec!["oops on stderr"]);
    Ok(())
}

/// Several watches can gate a test one after the other on the same process.
#[tokio::test]
async fn sequential_watches_on_one_process() -> TestResult {
    init_tracing();

    let mut harness = temp_harness();
    harness.launch(
        "sh",
        sh("echo phase one; sleep 0.2; echo phase two; exec sleep 30"),
    )?;

    let first = harness.wait_for_output("phase one", secs(3)).await?;
    let second = harness.wait_for_output("phase two", secs(3)).await?;
    assert_eq!(first.line_number, 1);
    assert_eq!(second.line_number, 2);

    harness.stop(None).await?;
    Ok(())
}

/// A watch can follow a file other than the launched process's capture
/// buffer, including one that does not exist yet.
#[tokio::test]
async fn watch_with_capture_location_override() -> TestResult {
    init_tracing();

    let mut harness = temp_harness();
    let side_log = harness.root().join("side.log");
    let script = format!(
        "echo main output; sleep 0.2; echo 'side channel ready' > '{}'; exec sleep 30",
        side_log.display()
    );
    harness.launch("sh", sh(&script))?;

    let found = with_timeout(harness.wait_for_output_at(&side_log, "side channel", secs(3))).await?;
    assert_eq!(found.line, "side channel ready");

    let outcome = harness.stop(None).await?.expect("process was running");
    assert_eq!(outcome.lines, vec!["main output"]);
    Ok(())
}

/// The free function works without any harness or process at all.
#[tokio::test]
async fn wait_for_line_on_plain_file() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("plain.log");
    std::fs::write(&path, "alpha\nbeta\n")?;

    let found = wait_for_line(&path, "^b", Duration::from_secs(1), Duration::from_millis(10)).await?;
    assert_eq!(found.line, "beta");

    let err = wait_for_line(&path, "gamma", Duration::from_millis(200), Duration::from_millis(10))
        .await
        .expect_err("gamma never written");
    assert!(matches!(err, HarnessError::WaitTimeout { ref output, .. } if output == "alpha\nbeta\n"));

    let missing = dir.path().join("never-created.log");
    let err = wait_for_line(&missing, "x", millis(200).unwrap(), Duration::from_millis(10))
        .await
        .expect_err("file never appears");
    assert!(matches!(err, HarnessError::WaitTimeout { ref output, .. } if output.is_empty()));
    Ok(())
}
