// src/status.rs

//! Operator-facing health snapshot.
//!
//! Reads only: the supervised handle's recorded state, `/proc` on Linux,
//! and the marker directory listing. Safe to call at any rate.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::supervisor::{ProcessState, SupervisedProcess};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// `None` when no engine has been started in this session.
    pub process_state: Option<ProcessState>,
    pub pid: Option<u32>,
    /// utime + stime in clock ticks (Linux only).
    pub cpu_ticks: Option<u64>,
    /// Resident set size in kB (Linux only).
    pub rss_kb: Option<u64>,
    pub marker_file_count: usize,
    pub last_config: String,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.process_state {
            Some(state) => writeln!(f, "engine:  {state}")?,
            None => writeln!(f, "engine:  not started")?,
        }
        if let Some(pid) = self.pid {
            write!(f, "pid:     {pid}")?;
            if let Some(ticks) = self.cpu_ticks {
                write!(f, "  cpu_ticks={ticks}")?;
            }
            if let Some(rss) = self.rss_kb {
                write!(f, "  rss={rss} kB")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "markers: {}", self.marker_file_count)?;
        write!(f, "config:  {}", self.last_config)
    }
}

#[derive(Debug, Clone)]
pub struct StatusReporter {
    marker_dir: PathBuf,
    last_config: String,
    process: Option<SupervisedProcess>,
}

impl StatusReporter {
    pub fn new(marker_dir: impl Into<PathBuf>, last_config: impl Into<String>) -> Self {
        Self {
            marker_dir: marker_dir.into(),
            last_config: last_config.into(),
            process: None,
        }
    }

    /// Track `handle` in subsequent snapshots.
    pub fn attach(&mut self, handle: &SupervisedProcess) {
        self.process = Some(handle.clone());
    }

    pub fn detach(&mut self) {
        self.process = None;
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let process_state = self.process.as_ref().map(SupervisedProcess::state);
        let pid = self.process.as_ref().and_then(SupervisedProcess::pid);

        // Only sample the OS while the child can still own that pid.
        let usage = match (pid, process_state) {
            (Some(pid), Some(state)) if !state.is_terminal() => read_process_usage(pid),
            _ => None,
        };

        StatusSnapshot {
            process_state,
            pid,
            cpu_ticks: usage.map(|u| u.cpu_ticks),
            rss_kb: usage.map(|u| u.rss_kb),
            marker_file_count: count_marker_files(&self.marker_dir),
            last_config: self.last_config.clone(),
        }
    }
}

/// Number of `*.xml` splice files in `dir`. A missing directory counts as 0.
pub fn count_marker_files(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "xml"))
        .count()
}

#[derive(Debug, Clone, Copy)]
struct ProcessUsage {
    cpu_ticks: u64,
    rss_kb: u64,
}

#[cfg(target_os = "linux")]
fn read_process_usage(pid: u32) -> Option<ProcessUsage> {
    let stat = fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    let status = fs::read_to_string(format!("/proc/{pid}/status")).ok()?;
    parse_proc_usage(&stat, &status)
}

#[cfg(not(target_os = "linux"))]
fn read_process_usage(_pid: u32) -> Option<ProcessUsage> {
    None
}

/// `stat` is "pid (comm) state ppid ..."; comm may contain spaces and
/// parens, so fields are counted from the last ')'.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_proc_usage(stat: &str, status: &str) -> Option<ProcessUsage> {
    let rest = stat.get(stat.rfind(')')? + 2..)?;
    let fields: Vec<&str> = rest.split_whitespace().collect();
    // fields[0] is field 3 (state); utime and stime are fields 14 and 15.
    let utime: u64 = fields.get(11)?.parse().ok()?;
    let stime: u64 = fields.get(12)?.parse().ok()?;

    let rss_kb = status
        .lines()
        .find(|l| l.starts_with("VmRSS:"))
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    Some(ProcessUsage {
        cpu_ticks: utime + stime,
        rss_kb,
    })
}
