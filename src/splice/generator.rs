// src/splice/generator.rs

use tracing::debug;

use crate::config::SignalSettings;
use crate::errors::SpliceError;
use crate::splice::command::SpliceCommand;
use crate::splice::pts::{ms_to_ticks, seconds_to_ticks};
use crate::types::{PolicyKind, SpliceKind};

/// Fixed break length for emergency crash-outs.
pub const CRASH_OUT_DURATION_SECS: u32 = 30;

/// Builds splice commands for one session.
///
/// The generator does not hand out event ids. It only remembers the last id
/// it accepted and rejects anything that is not strictly larger, so that the
/// downstream de-duplication never sees a repeated id.
#[derive(Debug, Clone)]
pub struct SpliceGenerator {
    ad_duration_seconds: u32,
    preroll_ms: u32,
    unique_program_id: u16,
    kind: SpliceKind,
    last_event_id: Option<u32>,
}

impl SpliceGenerator {
    pub fn new(settings: &SignalSettings) -> Self {
        Self {
            ad_duration_seconds: settings.ad_duration_seconds,
            preroll_ms: settings.preroll_ms,
            unique_program_id: settings.unique_program_id,
            kind: settings.command,
            last_event_id: None,
        }
    }

    pub fn last_event_id(&self) -> Option<u32> {
        self.last_event_id
    }

    /// Build the command for `policy`.
    ///
    /// | policy    | out_of_network | has_duration | immediate | duration            |
    /// |-----------|----------------|--------------|-----------|---------------------|
    /// | cue-out   | yes            | yes          | no        | ad duration         |
    /// | cue-in    | no             | no           | no        | -                   |
    /// | preroll   | yes            | yes          | no        | ad duration+preroll |
    /// | crash-out | yes            | yes          | yes       | 30 s                |
    pub fn generate(
        &mut self,
        policy: PolicyKind,
        event_id: u32,
        now_pts: u64,
    ) -> Result<SpliceCommand, SpliceError> {
        if let Some(last) = self.last_event_id {
            if event_id <= last {
                return Err(SpliceError::NonMonotonicEventId {
                    last,
                    got: event_id,
                });
            }
        }

        let (out_of_network, immediate, duration) = match policy {
            PolicyKind::CueOut => (true, false, Some(seconds_to_ticks(self.ad_duration_seconds))),
            PolicyKind::CueIn => (false, false, None),
            PolicyKind::Preroll => (
                true,
                false,
                Some(seconds_to_ticks(self.ad_duration_seconds) + ms_to_ticks(self.preroll_ms)),
            ),
            PolicyKind::CrashOut => (true, true, Some(seconds_to_ticks(CRASH_OUT_DURATION_SECS))),
        };

        let duration_ticks = match duration {
            Some(ticks) => {
                u32::try_from(ticks).map_err(|_| SpliceError::DurationOverflow { ticks })?
            }
            None => 0,
        };
        let has_duration = duration.is_some();

        let command = SpliceCommand {
            event_id,
            kind: self.kind,
            cancel: false,
            out_of_network,
            program_splice: true,
            has_duration,
            immediate,
            pts_time: (!immediate).then_some(now_pts),
            duration_ticks,
            auto_return: has_duration,
            unique_program_id: self.unique_program_id,
        };

        self.last_event_id = Some(event_id);
        debug!(
            event_id,
            %policy,
            pts = ?command.pts_time,
            duration_ticks,
            "splice command generated"
        );
        Ok(command)
    }
}
