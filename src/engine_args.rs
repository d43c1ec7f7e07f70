// src/engine_args.rs

//! Argument list for the external stream-processing engine.
//!
//! Layout: `<program> -I <input> -P pmt ... -P spliceinject ... -O <output>`.
//! The supervisor never looks inside this vector.

use std::path::PathBuf;

use crate::config::{ResolvedConfig, StreamEndpoint};
use crate::types::{SrtMode, StreamKind};

/// Registration descriptor format identifier "CUEI".
const CUEI_REGISTRATION: &str = "0x43554549";

/// Stream type for SCTE-35 sections in the PMT.
const SCTE35_STREAM_TYPE: &str = "0x86";

pub fn build_engine_args(cfg: &ResolvedConfig, splice_files: &[PathBuf]) -> Vec<String> {
    let mut args = vec![cfg.engine.program.clone()];

    push_input(&mut args, &cfg.input);

    let service_id = cfg.service.service_id.to_string();
    let policy = &cfg.injection;

    // Declare the signal PID in the PMT so downstream demuxers pick it up.
    args.extend([
        "-P".into(),
        "pmt".into(),
        "--service".into(),
        service_id.clone(),
        "--add-pid".into(),
        format!("{}/{SCTE35_STREAM_TYPE}", policy.target_pid),
        "--add-registration".into(),
        CUEI_REGISTRATION.into(),
    ]);

    args.extend([
        "-P".into(),
        "spliceinject".into(),
        "--service".into(),
        service_id,
        "--pid".into(),
        policy.target_pid.to_string(),
        "--pts-pid".into(),
        policy.pts_reference_pid.to_string(),
    ]);
    if !splice_files.is_empty() {
        args.push("--files".into());
        args.extend(splice_files.iter().map(|p| p.display().to_string()));
    }
    args.extend([
        "--inject-count".into(),
        policy.repeat_count.to_string(),
        "--inject-interval".into(),
        policy.repeat_interval_ms.to_string(),
        "--start-delay".into(),
        policy.start_delay_ms.to_string(),
    ]);

    push_output(&mut args, &cfg.output);
    args
}

fn push_input(args: &mut Vec<String>, input: &StreamEndpoint) {
    let plugin = match input.kind {
        StreamKind::Hls => "hls",
        StreamKind::File => "file",
        StreamKind::Udp | StreamKind::Srt => "ip",
    };
    args.extend(["-I".into(), plugin.into(), input.address.clone()]);
}

fn push_output(args: &mut Vec<String>, output: &StreamEndpoint) {
    args.push("-O".into());
    match output.kind {
        StreamKind::Srt => {
            args.push("srt".into());
            let srt = output.srt.as_ref();
            let mode = match srt.map(|s| s.mode).unwrap_or_default() {
                SrtMode::Caller => "--caller",
                SrtMode::Listener => "--listener",
            };
            args.extend([mode.into(), output.address.clone()]);
            if let Some(stream_id) = srt.and_then(|s| s.stream_id.as_ref()) {
                args.extend(["--streamid".into(), stream_id.clone()]);
            }
            if let Some(latency) = srt.and_then(|s| s.latency_ms) {
                args.extend(["--latency".into(), latency.to_string()]);
            }
        }
        StreamKind::File => args.extend(["file".into(), output.address.clone()]),
        StreamKind::Udp | StreamKind::Hls => args.extend(["ip".into(), output.address.clone()]),
    }

    for (key, value) in &output.extra_params {
        args.push(format!("--{}", key.trim_start_matches('-')));
        if !value.is_empty() {
            args.push(value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{normalize, ConfigRecord, OutputSection};

    fn resolved(record: ConfigRecord) -> ResolvedConfig {
        ResolvedConfig::try_from(normalize(record)).unwrap()
    }

    fn window<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn default_config_builds_udp_pipeline() {
        let cfg = resolved(ConfigRecord::default());
        let args = build_engine_args(&cfg, &[PathBuf::from("/tmp/splice_1.xml")]);

        assert_eq!(args[0], "tsp");
        assert_eq!(&args[1..4], ["-I", "ip", "127.0.0.1:4000"]);
        assert_eq!(window(&args, "--pid"), Some("500"));
        assert_eq!(window(&args, "--pts-pid"), Some("256"));
        assert_eq!(window(&args, "--add-pid"), Some("500/0x86"));
        assert_eq!(window(&args, "--files"), Some("/tmp/splice_1.xml"));
        assert_eq!(window(&args, "--inject-count"), Some("1"));
        assert_eq!(&args[args.len() - 3..], ["-O", "ip", "127.0.0.1:4001"]);
    }

    #[test]
    fn srt_output_carries_connection_parameters() {
        let mut extra = std::collections::BTreeMap::new();
        extra.insert("transtype".to_string(), "live".to_string());
        let record = ConfigRecord {
            output: Some(OutputSection {
                kind: StreamKind::Srt,
                source: "10.0.0.5:9000".into(),
                srt_mode: SrtMode::Listener,
                stream_id: Some("ads-east".into()),
                latency_ms: Some(200),
                extra_params: extra,
            }),
            ..ConfigRecord::default()
        };
        let args = build_engine_args(&resolved(record), &[]);

        assert_eq!(window(&args, "srt"), Some("--listener"));
        assert_eq!(window(&args, "--listener"), Some("10.0.0.5:9000"));
        assert_eq!(window(&args, "--streamid"), Some("ads-east"));
        assert_eq!(window(&args, "--latency"), Some("200"));
        assert_eq!(window(&args, "--transtype"), Some("live"));
        assert!(!args.contains(&"--files".to_string()));
    }
}
