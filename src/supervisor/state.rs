// src/supervisor/state.rs

use std::fmt;

/// Lifecycle of a supervised engine process.
///
/// `Created -> Running -> (Stopped | Crashed | Killed)`. The last three are
/// terminal; a handle never leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Created,
    Running,
    /// Exited after an explicit graceful stop.
    Stopped,
    /// Exited on its own before any stop was requested.
    Crashed { code: Option<i32> },
    /// Ignored the graceful request and was forcibly killed.
    Killed,
}

impl ProcessState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessState::Stopped | ProcessState::Crashed { .. } | ProcessState::Killed
        )
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ProcessState::Running)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Created => f.write_str("created"),
            ProcessState::Running => f.write_str("running"),
            ProcessState::Stopped => f.write_str("stopped"),
            ProcessState::Crashed { code: Some(code) } => write!(f, "crashed (exit {code})"),
            ProcessState::Crashed { code: None } => f.write_str("crashed (signal)"),
            ProcessState::Killed => f.write_str("killed"),
        }
    }
}

/// Which pipe a captured line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub text: String,
}
