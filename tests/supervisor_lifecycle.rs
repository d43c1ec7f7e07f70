// tests/supervisor_lifecycle.rs
#![cfg(unix)]

mod common;
use crate::common::engine::{crashing_engine, sh, stubborn_engine};
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::time::Duration;

use tokio::time::sleep;

use scte35_inject::errors::InjectError;
use scte35_inject::supervisor::{ProcessState, ProcessSupervisor, SupervisedProcess};
use scte35_inject::verify::MarkerVerifier;

type TestResult = Result<(), Box<dyn Error>>;

/// Poll until the handle leaves `Running` (or the test times out).
async fn wait_until_exited(handle: &SupervisedProcess) -> ProcessState {
    with_timeout(async {
        loop {
            let state = handle.poll();
            if state.is_terminal() {
                return state;
            }
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
}

#[tokio::test]
async fn early_exit_is_crashed_and_observe_is_empty() -> TestResult {
    init_tracing();

    let supervisor = ProcessSupervisor::new();
    let handle = supervisor.start(&crashing_engine(3))?;

    let state = wait_until_exited(&handle).await;
    assert_eq!(state, ProcessState::Crashed { code: Some(3) });

    let verifier = MarkerVerifier::new();
    let observed = with_timeout(
        verifier
            .observe(&handle, Duration::from_secs(2), None)
            .collect(),
    )
    .await;
    assert!(observed.is_empty());

    // Stop after a crash does not rewrite history.
    let stopped = supervisor.stop(&handle, Duration::from_millis(100)).await;
    assert_eq!(stopped, ProcessState::Crashed { code: Some(3) });
    Ok(())
}

#[tokio::test]
async fn crash_before_stop_is_detected_by_stop_itself() -> TestResult {
    init_tracing();

    let supervisor = ProcessSupervisor::new();
    let handle = supervisor.start(&crashing_engine(0))?;
    sleep(Duration::from_millis(300)).await;

    // No poll in between: stop must still notice the process was gone.
    let state = with_timeout(supervisor.stop(&handle, Duration::from_millis(100))).await;
    assert_eq!(state, ProcessState::Crashed { code: Some(0) });
    Ok(())
}

#[tokio::test]
async fn graceful_stop_is_idempotent() -> TestResult {
    init_tracing();

    let supervisor = ProcessSupervisor::new();
    let handle = supervisor.start(&sh("sleep 30"))?;
    assert_eq!(supervisor.poll(&handle), ProcessState::Running);
    assert!(handle.pid().is_some());

    let first = with_timeout(supervisor.stop(&handle, Duration::from_secs(2))).await;
    let second = with_timeout(supervisor.stop(&handle, Duration::from_secs(2))).await;

    assert_eq!(first, ProcessState::Stopped);
    assert_eq!(second, first);
    assert_eq!(supervisor.poll(&handle), ProcessState::Stopped);
    Ok(())
}

#[tokio::test]
async fn ignored_termination_escalates_to_kill() -> TestResult {
    init_tracing();

    let supervisor = ProcessSupervisor::new();
    let handle = supervisor.start(&stubborn_engine())?;
    // Give the shell time to install its trap.
    sleep(Duration::from_millis(200)).await;

    let state = with_timeout(supervisor.stop(&handle, Duration::from_millis(300))).await;
    assert_eq!(state, ProcessState::Killed);

    let again = with_timeout(supervisor.stop(&handle, Duration::from_millis(300))).await;
    assert_eq!(again, ProcessState::Killed);
    Ok(())
}

#[tokio::test]
async fn concurrent_stops_agree_on_one_outcome() -> TestResult {
    init_tracing();

    let supervisor = ProcessSupervisor::new();
    let handle = supervisor.start(&sh("sleep 30"))?;
    let other = handle.clone();

    let (a, b) = with_timeout(async {
        tokio::join!(
            handle.stop(Duration::from_secs(2)),
            other.stop(Duration::from_secs(2)),
        )
    })
    .await;

    assert_eq!(a, ProcessState::Stopped);
    assert_eq!(b, ProcessState::Stopped);
    Ok(())
}

#[tokio::test]
async fn missing_executable_is_a_spawn_error() {
    init_tracing();

    let supervisor = ProcessSupervisor::new();
    let err = supervisor
        .start(&["/definitely/not/an/engine".to_string()])
        .unwrap_err();

    match err {
        InjectError::Spawn { program, .. } => assert_eq!(program, "/definitely/not/an/engine"),
        other => panic!("expected Spawn error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_argv_is_rejected() {
    let err = ProcessSupervisor::new().start(&[]).unwrap_err();
    assert!(matches!(err, InjectError::EmptyArgv));
}
