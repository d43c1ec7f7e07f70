// src/config/normalize.rs

//! The single table of defaults for the four core sections.
//!
//! `normalize` is pure: it never touches the filesystem and a record that
//! already has every section comes back unchanged.

use std::collections::BTreeMap;

use crate::config::model::{
    ConfigRecord, InputSection, OutputSection, ServiceSection, SignalSection,
};
use crate::types::{SrtMode, StreamKind};

pub const DEFAULT_INPUT_SOURCE: &str = "127.0.0.1:4000";
pub const DEFAULT_OUTPUT_SOURCE: &str = "127.0.0.1:4001";

pub const DEFAULT_SERVICE_NAME: &str = "Service01";
pub const DEFAULT_PROVIDER_NAME: &str = "Provider01";
pub const DEFAULT_SERVICE_ID: i64 = 1;
pub const DEFAULT_VIDEO_PID: i64 = 256;
pub const DEFAULT_AUDIO_PID: i64 = 257;
pub const DEFAULT_SIGNAL_PID: i64 = 500;
pub const DEFAULT_NULL_PID: i64 = 8191;
pub const DEFAULT_PCR_PID: i64 = 256;

pub const DEFAULT_AD_DURATION_SECONDS: i64 = 600;
pub const DEFAULT_EVENT_ID: i64 = 100_023;
pub const DEFAULT_PREROLL_MS: i64 = 0;

pub fn default_input() -> InputSection {
    InputSection {
        kind: StreamKind::Udp,
        source: DEFAULT_INPUT_SOURCE.to_string(),
    }
}

pub fn default_output() -> OutputSection {
    OutputSection {
        kind: StreamKind::Udp,
        source: DEFAULT_OUTPUT_SOURCE.to_string(),
        srt_mode: SrtMode::Caller,
        stream_id: None,
        latency_ms: None,
        extra_params: BTreeMap::new(),
    }
}

pub fn default_service() -> ServiceSection {
    ServiceSection {
        service_name: DEFAULT_SERVICE_NAME.to_string(),
        provider_name: DEFAULT_PROVIDER_NAME.to_string(),
        service_id: DEFAULT_SERVICE_ID,
        video_pid: DEFAULT_VIDEO_PID,
        audio_pid: DEFAULT_AUDIO_PID,
        signal_pid: DEFAULT_SIGNAL_PID,
        null_pid: DEFAULT_NULL_PID,
        pcr_pid: DEFAULT_PCR_PID,
    }
}

pub fn default_signal() -> SignalSection {
    SignalSection {
        ad_duration_seconds: DEFAULT_AD_DURATION_SECONDS,
        event_id: DEFAULT_EVENT_ID,
        preroll_ms: DEFAULT_PREROLL_MS,
    }
}

/// Fill any missing core section with its default.
pub fn normalize(mut record: ConfigRecord) -> ConfigRecord {
    record.input.get_or_insert_with(default_input);
    record.output.get_or_insert_with(default_output);
    record.service.get_or_insert_with(default_service);
    record.signal.get_or_insert_with(default_signal);
    record
}
