// src/splice/command.rs

use crate::types::SpliceKind;

/// A single splice command, ready to be rendered for the engine.
///
/// Immutable once built; a new request produces a new value.
/// `pts_time` is `Some` exactly when `immediate` is false, and
/// `duration_ticks` is in 90 kHz ticks (0 when `has_duration` is false).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceCommand {
    pub event_id: u32,
    pub kind: SpliceKind,
    pub cancel: bool,
    pub out_of_network: bool,
    pub program_splice: bool,
    pub has_duration: bool,
    pub immediate: bool,
    pub pts_time: Option<u64>,
    pub duration_ticks: u32,
    pub auto_return: bool,
    pub unique_program_id: u16,
}

impl SpliceCommand {
    /// Cancel a previously signalled event. Carries no timing.
    pub fn cancel_event(event_id: u32, unique_program_id: u16) -> Self {
        Self {
            event_id,
            kind: SpliceKind::Insert,
            cancel: true,
            out_of_network: false,
            program_splice: true,
            has_duration: false,
            immediate: false,
            pts_time: None,
            duration_ticks: 0,
            auto_return: false,
            unique_program_id,
        }
    }

    /// Break length in whole seconds, rounded down.
    pub fn duration_secs(&self) -> u32 {
        self.duration_ticks / crate::splice::pts::TICKS_PER_SECOND as u32
    }
}
