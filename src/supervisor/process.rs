// src/supervisor/process.rs

//! Spawning and terminating the external engine.

use std::process::Stdio;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, trace, warn};

use crate::errors::{InjectError, Result};
use crate::supervisor::state::{OutputLine, OutputStream, ProcessState};

/// Lines buffered between the pipe readers and the verifier. When full,
/// new lines are dropped so the child never stalls on a blocked pipe.
pub const DEFAULT_OUTPUT_CAPACITY: usize = 1024;

/// Starts engine processes and hands out handles to them.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    output_capacity: usize,
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self {
            output_capacity: DEFAULT_OUTPUT_CAPACITY,
        }
    }
}

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `argv[0]` with the remaining arguments.
    ///
    /// Returns as soon as the OS has created the process. Must be called
    /// from inside a Tokio runtime because the pipe readers are spawned as
    /// tasks.
    pub fn start(&self, argv: &[String]) -> Result<SupervisedProcess> {
        let (program, args) = argv.split_first().ok_or(InjectError::EmptyArgv)?;

        info!(%program, args = ?args, "starting external engine");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| InjectError::Spawn {
            program: program.clone(),
            source,
        })?;

        let pid = child.id();
        let (tx, rx) = mpsc::channel::<OutputLine>(self.output_capacity);

        if let Some(stdout) = child.stdout.take() {
            spawn_line_reader(stdout, OutputStream::Stdout, tx.clone(), pid);
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_line_reader(stderr, OutputStream::Stderr, tx, pid);
        }

        let handle = SupervisedProcess {
            inner: Arc::new(Inner {
                program: program.clone(),
                pid,
                child: Mutex::new(Some(child)),
                state: StdMutex::new(ProcessState::Created),
                output: Arc::new(Mutex::new(rx)),
            }),
        };
        handle.set_state(ProcessState::Running);
        Ok(handle)
    }

    pub fn poll(&self, handle: &SupervisedProcess) -> ProcessState {
        handle.poll()
    }

    pub async fn stop(&self, handle: &SupervisedProcess, grace_period: Duration) -> ProcessState {
        handle.stop(grace_period).await
    }
}

/// Forward every line of `pipe` into the shared output channel.
///
/// Read errors end the reader; the channel closes once both readers are gone.
fn spawn_line_reader<R>(
    pipe: R,
    stream: OutputStream,
    tx: mpsc::Sender<OutputLine>,
    pid: Option<u32>,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(text)) = lines.next_line().await {
            trace!(?pid, ?stream, "{}", text);
            if tx.try_send(OutputLine { stream, text }).is_err() && tx.is_closed() {
                break;
            }
        }
        debug!(?pid, ?stream, "engine output reader ended");
    });
}

struct Inner {
    program: String,
    pid: Option<u32>,
    /// `None` once the child has been reaped. Holding this lock is what
    /// serializes concurrent `stop` calls.
    child: Mutex<Option<Child>>,
    state: StdMutex<ProcessState>,
    output: Arc<Mutex<mpsc::Receiver<OutputLine>>>,
}

/// Handle to one engine process. Clones share the same process.
///
/// Dropping the last clone kills the process if it is still running.
#[derive(Clone)]
pub struct SupervisedProcess {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SupervisedProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupervisedProcess")
            .field("program", &self.inner.program)
            .field("pid", &self.inner.pid)
            .field("state", &self.state())
            .finish()
    }
}

impl SupervisedProcess {
    pub fn pid(&self) -> Option<u32> {
        self.inner.pid
    }

    /// Last recorded state, without checking the OS.
    pub fn state(&self) -> ProcessState {
        match self.inner.state.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_state(&self, next: ProcessState) {
        let mut guard = match self.inner.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let prev = *guard;
        if prev != next {
            debug!(pid = ?self.inner.pid, from = %prev, to = %next, "engine state change");
            *guard = next;
        }
    }

    pub(crate) fn output(&self) -> Arc<Mutex<mpsc::Receiver<OutputLine>>> {
        Arc::clone(&self.inner.output)
    }

    /// Non-blocking state check.
    ///
    /// A child that exited on its own is recorded as `Crashed`. While a
    /// `stop` is in progress the last recorded state is returned.
    pub fn poll(&self) -> ProcessState {
        let current = self.state();
        if current.is_terminal() {
            return current;
        }

        let Ok(mut guard) = self.inner.child.try_lock() else {
            return current;
        };
        let Some(child) = guard.as_mut() else {
            return self.state();
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                let code = status.code();
                warn!(
                    pid = ?self.inner.pid,
                    ?code,
                    "external engine exited before stop was requested"
                );
                *guard = None;
                self.set_state(ProcessState::Crashed { code });
            }
            Ok(None) => {}
            Err(e) => {
                warn!(pid = ?self.inner.pid, error = %e, "failed to query engine status");
            }
        }
        self.state()
    }

    /// Graceful-then-forced termination.
    ///
    /// Sends a termination request and waits up to `grace_period`. If the
    /// process is still alive after that it is killed and reaped. Calling
    /// this on a handle that already reached a terminal state is a no-op
    /// that returns that state.
    pub async fn stop(&self, grace_period: Duration) -> ProcessState {
        let mut guard = self.inner.child.lock().await;

        let current = self.state();
        if current.is_terminal() {
            return current;
        }
        let Some(child) = guard.as_mut() else {
            return current;
        };

        // Already gone before we asked: that is a crash, not a stop.
        if let Ok(Some(status)) = child.try_wait() {
            *guard = None;
            let state = ProcessState::Crashed {
                code: status.code(),
            };
            self.set_state(state);
            return state;
        }

        info!(
            pid = ?self.inner.pid,
            grace_ms = grace_period.as_millis() as u64,
            "stopping external engine"
        );
        request_termination(child, self.inner.pid);

        let state = match tokio::time::timeout(grace_period, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(
                    pid = ?self.inner.pid,
                    code = ?status.code(),
                    "engine exited after termination request"
                );
                ProcessState::Stopped
            }
            Ok(Err(e)) => {
                warn!(pid = ?self.inner.pid, error = %e, "waiting for engine failed; forcing kill");
                force_kill(child, self.inner.pid).await;
                ProcessState::Killed
            }
            Err(_) => {
                warn!(
                    pid = ?self.inner.pid,
                    "engine did not exit within grace period; forcing kill"
                );
                force_kill(child, self.inner.pid).await;
                ProcessState::Killed
            }
        };

        *guard = None;
        self.set_state(state);
        info!(pid = ?self.inner.pid, %state, "external engine stopped");
        state
    }
}

#[cfg(unix)]
fn request_termination(_child: &mut Child, pid: Option<u32>) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Some(pid) = pid.and_then(|p| i32::try_from(p).ok()) else {
        return;
    };
    if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
        debug!(pid, error = %e, "SIGTERM delivery failed");
    }
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child, pid: Option<u32>) {
    // No graceful signal available; the kill request is the best we have.
    if let Err(e) = child.start_kill() {
        debug!(?pid, error = %e, "termination request failed");
    }
}

/// Kill and reap. Always waits so the child never lingers as a zombie.
async fn force_kill(child: &mut Child, pid: Option<u32>) {
    if let Err(e) = child.start_kill() {
        debug!(?pid, error = %e, "kill request failed (process may already be gone)");
    }
    if let Err(e) = child.wait().await {
        warn!(?pid, error = %e, "failed to reap killed engine");
    }
}
