// src/session.rs

//! One operator session: config is fixed, event ids count up, and each
//! injection request runs the engine through a full start/observe/stop cycle.

use std::future::Future;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::ResolvedConfig;
use crate::engine_args::build_engine_args;
use crate::errors::{InjectError, Result};
use crate::splice::{
    marker_file_name, now_pts, write_marker_file, SpliceCommand, SpliceGenerator,
};
use crate::status::{StatusReporter, StatusSnapshot};
use crate::supervisor::{ProcessState, ProcessSupervisor};
use crate::types::PolicyKind;
use crate::verify::{MarkerObservation, MarkerVerifier};

/// Result of one injection cycle.
#[derive(Debug, Clone)]
pub struct InjectionReport {
    pub command: SpliceCommand,
    pub marker_file: PathBuf,
    pub observations: Vec<MarkerObservation>,
    pub final_state: ProcessState,
    pub interrupted: bool,
    pub snapshot: StatusSnapshot,
}

impl InjectionReport {
    /// Whether any marker-like line was seen. Advisory only.
    pub fn marker_seen(&self) -> bool {
        !self.observations.is_empty()
    }

    /// Turn an unexpected engine exit into an error for the caller.
    pub fn ensure_not_crashed(&self) -> Result<()> {
        match self.final_state {
            ProcessState::Crashed { code } => Err(InjectError::ProcessCrashed { code }),
            _ => Ok(()),
        }
    }
}

pub struct Session {
    config: ResolvedConfig,
    generator: SpliceGenerator,
    supervisor: ProcessSupervisor,
    verifier: MarkerVerifier,
    reporter: StatusReporter,
    next_event_id: u32,
}

impl Session {
    pub fn new(config: ResolvedConfig) -> Self {
        let generator = SpliceGenerator::new(&config.signal);
        let reporter = StatusReporter::new(&config.engine.marker_dir, config.summary());
        let next_event_id = config.signal.event_id;
        Self {
            config,
            generator,
            supervisor: ProcessSupervisor::new(),
            verifier: MarkerVerifier::new(),
            reporter,
            next_event_id,
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.reporter.snapshot()
    }

    /// Generate the next command for `kind` and its engine argument list
    /// without writing or spawning anything.
    pub fn plan(&mut self, kind: PolicyKind) -> Result<(SpliceCommand, Vec<String>)> {
        let command = self.next_command(kind)?;
        let file = self.config.engine.marker_dir.join(marker_file_name(&command));
        let argv = build_engine_args(&self.config, &[file]);
        Ok((command, argv))
    }

    /// Run one cycle, stopping early on Ctrl-C.
    pub async fn inject(&mut self, kind: PolicyKind) -> Result<InjectionReport> {
        self.inject_until(kind, ctrl_c()).await
    }

    /// Run one cycle; `shutdown` completing ends observation early.
    ///
    /// The engine is always stopped before this returns, whatever happened
    /// during observation.
    pub async fn inject_until<F>(
        &mut self,
        kind: PolicyKind,
        shutdown: F,
    ) -> Result<InjectionReport>
    where
        F: Future<Output = ()>,
    {
        let command = self.next_command(kind)?;
        info!(event_id = command.event_id, %kind, "injecting splice command");
        self.run_cycle(command, shutdown).await
    }

    /// Inject a cancel for `event_id`, stopping early on Ctrl-C.
    pub async fn cancel(&mut self, event_id: u32) -> Result<InjectionReport> {
        self.cancel_until(event_id, ctrl_c()).await
    }

    /// Run one cycle that cancels a previously signalled event.
    ///
    /// The cancel refers to an existing id, so it does not take one from
    /// the session counter.
    pub async fn cancel_until<F>(&mut self, event_id: u32, shutdown: F) -> Result<InjectionReport>
    where
        F: Future<Output = ()>,
    {
        let command = SpliceCommand {
            kind: self.config.signal.command,
            ..SpliceCommand::cancel_event(event_id, self.config.signal.unique_program_id)
        };
        info!(event_id, "cancelling splice event");
        self.run_cycle(command, shutdown).await
    }

    async fn run_cycle<F>(&mut self, command: SpliceCommand, shutdown: F) -> Result<InjectionReport>
    where
        F: Future<Output = ()>,
    {
        let marker_file = write_marker_file(&self.config.engine.marker_dir, &command)?;
        info!(event_id = command.event_id, file = %marker_file.display(), "splice file written");

        let argv = build_engine_args(&self.config, std::slice::from_ref(&marker_file));
        let handle = self.supervisor.start(&argv)?;
        self.reporter.attach(&handle);

        let engine = &self.config.engine;
        let mut window = self.verifier.observe(
            &handle,
            engine.observe_window,
            Some(self.config.injection.target_pid),
        );
        let mut ticker = tokio::time::interval(engine.snapshot_interval);
        ticker.tick().await;
        tokio::pin!(shutdown);

        let mut observations = Vec::new();
        let mut interrupted = false;
        loop {
            tokio::select! {
                obs = window.next() => match obs {
                    Some(obs) => observations.push(obs),
                    None => break,
                },
                _ = ticker.tick() => {
                    let snap = self.reporter.snapshot();
                    info!(
                        state = ?snap.process_state,
                        cpu_ticks = ?snap.cpu_ticks,
                        rss_kb = ?snap.rss_kb,
                        markers = snap.marker_file_count,
                        "engine status"
                    );
                }
                _ = &mut shutdown => {
                    info!("shutdown requested; ending observation early");
                    interrupted = true;
                    break;
                }
            }
        }
        drop(window);

        // Record an early exit before stop so it is reported as a crash.
        handle.poll();
        let final_state = self.supervisor.stop(&handle, engine.grace_period).await;
        let snapshot = self.reporter.snapshot();
        self.reporter.detach();

        info!(
            event_id = command.event_id,
            observed = observations.len(),
            state = %final_state,
            "injection cycle finished"
        );
        if observations.is_empty() && !interrupted {
            warn!(event_id = command.event_id, "no marker trace seen in engine output");
        }

        Ok(InjectionReport {
            command,
            marker_file,
            observations,
            final_state,
            interrupted,
            snapshot,
        })
    }

    fn next_command(&mut self, kind: PolicyKind) -> Result<SpliceCommand> {
        let event_id = self.next_event_id;
        let command = self.generator.generate(kind, event_id, now_pts())?;
        self.next_event_id = event_id.wrapping_add(1);
        Ok(command)
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
