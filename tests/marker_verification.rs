// tests/marker_verification.rs
#![cfg(unix)]

mod common;
use crate::common::engine::{chatty_engine, sh};
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::time::{Duration, Instant};

use scte35_inject::supervisor::{OutputStream, ProcessSupervisor};
use scte35_inject::verify::{MarkerClassifier, MarkerVerifier};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn zero_window_returns_immediately() -> TestResult {
    init_tracing();

    let supervisor = ProcessSupervisor::new();
    let handle = supervisor.start(&chatty_engine(500, 5))?;
    let verifier = MarkerVerifier::new();

    let started = Instant::now();
    let observed = verifier.observe(&handle, Duration::ZERO, None).collect().await;

    assert!(observed.is_empty());
    assert!(started.elapsed() < Duration::from_millis(50));

    supervisor.stop(&handle, Duration::from_secs(1)).await;
    Ok(())
}

#[tokio::test]
async fn marker_lines_from_both_streams_are_observed() -> TestResult {
    init_tracing();

    let supervisor = ProcessSupervisor::new();
    let handle = supervisor.start(&chatty_engine(500, 5))?;
    let verifier = MarkerVerifier::new();

    let observed = with_timeout(
        verifier
            .observe(&handle, Duration::from_millis(1_500), Some(500))
            .collect(),
    )
    .await;
    supervisor.stop(&handle, Duration::from_secs(1)).await;

    assert_eq!(observed.len(), 2, "observed: {observed:?}");
    assert_eq!(observed[0].keyword, "splice");
    assert!(observed.iter().any(|o| o.stream == OutputStream::Stdout));
    assert!(observed.iter().any(|o| o.stream == OutputStream::Stderr));
    assert!(observed.iter().all(|o| !o.raw_line.contains("bitrate")));
    Ok(())
}

#[tokio::test]
async fn pid_filter_drops_lines_for_other_pids() -> TestResult {
    init_tracing();

    let supervisor = ProcessSupervisor::new();
    let handle = supervisor.start(&chatty_engine(500, 5))?;
    let verifier = MarkerVerifier::new();

    let observed = with_timeout(
        verifier
            .observe(&handle, Duration::from_millis(800), Some(501))
            .collect(),
    )
    .await;
    supervisor.stop(&handle, Duration::from_secs(1)).await;

    assert!(observed.is_empty(), "observed: {observed:?}");
    Ok(())
}

#[tokio::test]
async fn window_ends_when_engine_is_stopped() -> TestResult {
    init_tracing();

    let supervisor = ProcessSupervisor::new();
    let handle = supervisor.start(&sh("sleep 30"))?;
    let verifier = MarkerVerifier::new();

    let stopper = {
        let handle = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            handle.stop(Duration::from_secs(1)).await
        })
    };

    let started = Instant::now();
    let observed = with_timeout(
        verifier
            .observe(&handle, Duration::from_secs(10), None)
            .collect(),
    )
    .await;

    assert!(observed.is_empty());
    assert!(started.elapsed() < Duration::from_secs(3));
    stopper.await?;
    Ok(())
}

#[tokio::test]
async fn window_outlives_closed_output_while_engine_runs() -> TestResult {
    init_tracing();

    let supervisor = ProcessSupervisor::new();
    let handle = supervisor.start(&sh("exec >/dev/null 2>&1; sleep 5"))?;
    let verifier = MarkerVerifier::new();

    let started = Instant::now();
    let observed = with_timeout(
        verifier
            .observe(&handle, Duration::from_millis(600), None)
            .collect(),
    )
    .await;

    assert!(observed.is_empty());
    assert!(
        started.elapsed() >= Duration::from_millis(550),
        "window ended after {:?}",
        started.elapsed()
    );
    assert!(handle.poll().is_running());

    supervisor.stop(&handle, Duration::from_secs(1)).await;
    Ok(())
}

/// A classifier that accepts everything, standing in for a different
/// detection strategy behind the same seam.
struct Everything;

impl MarkerClassifier for Everything {
    fn classify(&self, _line: &str) -> Option<&'static str> {
        Some("any")
    }
}

#[tokio::test]
async fn custom_classifier_plugs_in() -> TestResult {
    init_tracing();

    let supervisor = ProcessSupervisor::new();
    let handle = supervisor.start(&sh("echo one; echo two; sleep 5"))?;
    let verifier = MarkerVerifier::with_classifier(Everything);

    let mut window = verifier.observe(&handle, Duration::from_millis(800), None);
    let first = with_timeout(window.next()).await.expect("first line");
    assert_eq!(first.raw_line, "one");
    let second = with_timeout(window.next()).await.expect("second line");
    assert_eq!(second.raw_line, "two");
    assert_eq!(window.lines_scanned(), 2);

    supervisor.stop(&handle, Duration::from_secs(1)).await;
    Ok(())
}
