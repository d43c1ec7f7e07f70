// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{SpliceKind, SrtMode, StreamKind};

/// Configuration record as read from a TOML file.
///
/// ```toml
/// [input]
/// type = "hls"
/// source = "https://example.com/live/master.m3u8"
///
/// [output]
/// type = "srt"
/// source = "10.0.0.5:9000"
/// stream_id = "ads-east"
/// latency_ms = 200
///
/// [service]
/// service_name = "News"
/// provider_name = "Acme"
/// service_id = 1
/// video_pid = 256
/// audio_pid = 257
/// signal_pid = 500
/// null_pid = 8191
/// pcr_pid = 256
///
/// [signal]
/// ad_duration_seconds = 120
/// event_id = 100023
/// preroll_ms = 4000
/// ```
///
/// The four core sections may be absent on disk; `normalize` fills them.
/// Numbers are kept as `i64` (TOML's integer type) so that range problems are
/// reported as field-level validation errors instead of parse failures.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<SignalSection>,

    /// `[injection]`: how the engine repeats the splice command.
    #[serde(default)]
    pub injection: InjectionSection,

    /// `[engine]`: how the external engine is run and watched.
    #[serde(default)]
    pub engine: EngineSection,
}

/// `[input]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSection {
    #[serde(rename = "type")]
    pub kind: StreamKind,
    pub source: String,
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(rename = "type")]
    pub kind: StreamKind,
    pub source: String,

    /// Only meaningful for `type = "srt"`.
    #[serde(default)]
    pub srt_mode: SrtMode,

    /// Opaque SRT stream id, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<i64>,

    /// Extra `--key value` pairs appended to the output plugin.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_params: BTreeMap<String, String>,
}

/// `[service]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSection {
    pub service_name: String,
    pub provider_name: String,
    pub service_id: i64,
    pub video_pid: i64,
    pub audio_pid: i64,
    pub signal_pid: i64,
    pub null_pid: i64,
    pub pcr_pid: i64,
}

/// `[signal]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSection {
    pub ad_duration_seconds: i64,

    /// First event id used by a session; later requests count up from here.
    pub event_id: i64,

    #[serde(default)]
    pub preroll_ms: i64,
}

/// `[injection]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionSection {
    pub repeat_count: i64,
    pub repeat_interval_ms: i64,
    pub start_delay_ms: i64,
    pub command: SpliceKind,

    /// PID carrying the PTS reference; defaults to `service.video_pid`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pts_pid: Option<i64>,
}

impl Default for InjectionSection {
    fn default() -> Self {
        Self {
            repeat_count: 1,
            repeat_interval_ms: 0,
            start_delay_ms: 0,
            command: SpliceKind::Insert,
            pts_pid: None,
        }
    }
}

/// `[engine]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Executable of the external stream-processing engine.
    pub program: String,
    pub grace_period_ms: u64,
    pub observe_window_ms: u64,
    pub snapshot_interval_ms: u64,

    /// Where generated splice files are written. Relative paths are resolved
    /// against the directory holding the config file.
    pub marker_dir: PathBuf,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            program: "tsp".to_string(),
            grace_period_ms: 2_000,
            observe_window_ms: 10_000,
            snapshot_interval_ms: 1_000,
            marker_dir: PathBuf::from("markers"),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved (validated) view
// ---------------------------------------------------------------------------

/// Fully validated configuration. Only constructible through
/// `ResolvedConfig::try_from(ConfigRecord)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub input: StreamEndpoint,
    pub output: StreamEndpoint,
    pub service: ServiceDescriptor,
    pub signal: SignalSettings,
    pub injection: InjectionPolicy,
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamEndpoint {
    pub kind: StreamKind,
    pub address: String,
    pub srt: Option<SrtParams>,
    pub extra_params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SrtParams {
    pub mode: SrtMode,
    pub stream_id: Option<String>,
    pub latency_ms: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescriptor {
    pub service_name: String,
    pub provider_name: String,
    pub service_id: u16,
    pub video_pid: u16,
    pub audio_pid: u16,
    pub signal_pid: u16,
    pub pcr_pid: u16,
    pub null_pid: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalSettings {
    pub ad_duration_seconds: u32,
    pub event_id: u32,
    pub preroll_ms: u32,
    pub unique_program_id: u16,
    pub command: SpliceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionPolicy {
    pub target_pid: u16,
    pub pts_reference_pid: u16,
    pub repeat_count: u32,
    pub repeat_interval_ms: u32,
    pub start_delay_ms: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub program: String,
    pub grace_period: Duration,
    pub observe_window: Duration,
    pub snapshot_interval: Duration,
    pub marker_dir: PathBuf,
}

impl ResolvedConfig {
    /// One-line summary used by status output.
    pub fn summary(&self) -> String {
        format!(
            "{}:{} -> {}:{} service_id={} signal_pid={}",
            self.input.kind,
            self.input.address,
            self.output.kind,
            self.output.address,
            self.service.service_id,
            self.injection.target_pid,
        )
    }
}
