// src/verify/observe.rs

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};
use tokio::time::{sleep, timeout, timeout_at, Instant};
use tracing::debug;

use crate::supervisor::{OutputLine, OutputStream, SupervisedProcess};
use crate::verify::classifier::{mentions_pid, KeywordClassifier, MarkerClassifier};

/// Upper bound on how long one iteration waits for a line before it
/// re-checks the deadline and process state.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A line of engine output that looked like a marker trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerObservation {
    pub timestamp: SystemTime,
    pub raw_line: String,
    pub keyword: &'static str,
    pub stream: OutputStream,
}

/// Scans engine output for marker traces.
#[derive(Debug, Clone, Default)]
pub struct MarkerVerifier<C = KeywordClassifier> {
    classifier: C,
}

impl MarkerVerifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: MarkerClassifier> MarkerVerifier<C> {
    pub fn with_classifier(classifier: C) -> Self {
        Self { classifier }
    }

    /// Open a fresh observation window over `handle`'s live output.
    ///
    /// Nothing is read until the window is polled. The window ends at
    /// `window_duration` or when the process leaves `Running`, whichever
    /// comes first. Closed output pipes do not end the window.
    pub fn observe(
        &self,
        handle: &SupervisedProcess,
        window_duration: Duration,
        pid_filter: Option<u16>,
    ) -> ObservationWindow<'_, C> {
        ObservationWindow {
            classifier: &self.classifier,
            handle: handle.clone(),
            deadline: Instant::now() + window_duration,
            pid_filter,
            output: handle.output(),
            reader: None,
            output_closed: false,
            finished: false,
            lines_scanned: 0,
        }
    }
}

/// Single-use cursor over one observation window.
///
/// Holds the handle's output lock while reading, so two windows never
/// consume the same stream at once.
pub struct ObservationWindow<'a, C> {
    classifier: &'a C,
    handle: SupervisedProcess,
    deadline: Instant,
    pid_filter: Option<u16>,
    output: Arc<Mutex<mpsc::Receiver<OutputLine>>>,
    reader: Option<OwnedMutexGuard<mpsc::Receiver<OutputLine>>>,
    output_closed: bool,
    finished: bool,
    lines_scanned: usize,
}

impl<C: MarkerClassifier> ObservationWindow<'_, C> {
    /// Next positive observation, or `None` once the window is over.
    pub async fn next(&mut self) -> Option<MarkerObservation> {
        while !self.finished {
            let now = Instant::now();
            if now >= self.deadline || !self.handle.poll().is_running() {
                self.finish();
                break;
            }

            let wait = POLL_INTERVAL.min(self.deadline.saturating_duration_since(now));
            if self.output_closed {
                sleep(wait).await;
                continue;
            }

            if self.reader.is_none() {
                match timeout_at(self.deadline, Arc::clone(&self.output).lock_owned()).await {
                    Ok(guard) => self.reader = Some(guard),
                    Err(_) => {
                        self.finish();
                        break;
                    }
                }
            }
            let Some(reader) = self.reader.as_mut() else {
                break;
            };

            match timeout(wait, reader.recv()).await {
                Ok(Some(line)) => {
                    self.lines_scanned += 1;
                    if let Some(obs) = self.classify(line) {
                        return Some(obs);
                    }
                }
                // Both pipes closed. The engine can still be running, so
                // keep tracking its state until the window ends.
                Ok(None) => self.output_closed = true,
                Err(_) => {}
            }
        }
        None
    }

    /// Drain the rest of the window.
    pub async fn collect(mut self) -> Vec<MarkerObservation> {
        let mut out = Vec::new();
        while let Some(obs) = self.next().await {
            out.push(obs);
        }
        out
    }

    pub fn lines_scanned(&self) -> usize {
        self.lines_scanned
    }

    fn classify(&self, line: OutputLine) -> Option<MarkerObservation> {
        let keyword = self.classifier.classify(&line.text)?;
        if let Some(pid) = self.pid_filter {
            if !mentions_pid(&line.text, pid) {
                return None;
            }
        }
        debug!(keyword, line = %line.text, "marker trace observed");
        Some(MarkerObservation {
            timestamp: SystemTime::now(),
            raw_line: line.text,
            keyword,
            stream: line.stream,
        })
    }

    fn finish(&mut self) {
        if !self.finished {
            debug!(
                pid = ?self.handle.pid(),
                lines = self.lines_scanned,
                "observation window closed"
            );
        }
        self.finished = true;
        self.reader = None;
    }
}
