#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;

use scte35_inject::config::{
    normalize, ConfigRecord, EngineSection, OutputSection, ResolvedConfig, SignalSection,
};
use scte35_inject::types::{SpliceKind, SrtMode, StreamKind};

/// Builder for `ConfigRecord` to simplify test setup.
///
/// Starts from an empty record; sections not set explicitly are filled by
/// `normalize` in `resolve`.
pub struct ConfigRecordBuilder {
    record: ConfigRecord,
}

impl ConfigRecordBuilder {
    pub fn new() -> Self {
        Self {
            record: ConfigRecord::default(),
        }
    }

    pub fn with_srt_output(mut self, address: &str, stream_id: Option<&str>) -> Self {
        self.record.output = Some(OutputSection {
            kind: StreamKind::Srt,
            source: address.to_string(),
            srt_mode: SrtMode::Caller,
            stream_id: stream_id.map(str::to_string),
            latency_ms: None,
            extra_params: BTreeMap::new(),
        });
        self
    }

    pub fn with_signal(
        mut self,
        ad_duration_seconds: i64,
        event_id: i64,
        preroll_ms: i64,
    ) -> Self {
        self.record.signal = Some(SignalSection {
            ad_duration_seconds,
            event_id,
            preroll_ms,
        });
        self
    }

    pub fn with_command(mut self, kind: SpliceKind) -> Self {
        self.record.injection.command = kind;
        self
    }

    pub fn with_repeat(mut self, count: i64, interval_ms: i64) -> Self {
        self.record.injection.repeat_count = count;
        self.record.injection.repeat_interval_ms = interval_ms;
        self
    }

    /// Point the engine at `program`, write markers into `marker_dir`, and
    /// use short windows suitable for tests.
    pub fn with_engine(mut self, program: &str, marker_dir: &Path) -> Self {
        self.record.engine = EngineSection {
            program: program.to_string(),
            grace_period_ms: 500,
            observe_window_ms: 1_000,
            snapshot_interval_ms: 100,
            marker_dir: marker_dir.to_path_buf(),
        };
        self
    }

    pub fn with_observe_window_ms(mut self, ms: u64) -> Self {
        self.record.engine.observe_window_ms = ms;
        self
    }

    pub fn resolve(self) -> ResolvedConfig {
        ResolvedConfig::try_from(normalize(self.record))
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}
