// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{
    ConfigRecord, EngineSection, EngineSettings, InjectionPolicy, InjectionSection, InputSection,
    OutputSection, ResolvedConfig, ServiceDescriptor, ServiceSection, SignalSection,
    SignalSettings, SrtParams, StreamEndpoint,
};
use crate::errors::ConfigError;
use crate::splice::pts::{ms_to_ticks, seconds_to_ticks};
use crate::types::StreamKind;

/// Highest PID a 13-bit field can carry; also the null-packet PID.
pub const MAX_PID: u16 = 0x1FFF;

/// PIDs the signal stream must never use (PAT, CAT, null).
pub const RESERVED_SIGNAL_PIDS: [u16; 3] = [0x0000, 0x0001, 0x1FFF];

type Result<T> = std::result::Result<T, ConfigError>;

impl TryFrom<ConfigRecord> for ResolvedConfig {
    type Error = ConfigError;

    fn try_from(record: ConfigRecord) -> Result<Self> {
        let input = resolve_input(require(record.input, "input")?)?;
        let output = resolve_output(require(record.output, "output")?)?;
        let service = resolve_service(require(record.service, "service")?)?;
        let signal_section = require(record.signal, "signal")?;
        let injection = resolve_injection(&record.injection, &service)?;
        let signal = resolve_signal(&signal_section, &record.injection, &service)?;
        let engine = resolve_engine(record.engine)?;

        Ok(ResolvedConfig {
            input,
            output,
            service,
            signal,
            injection,
            engine,
        })
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn require<T>(section: Option<T>, name: &str) -> Result<T> {
    section.ok_or_else(|| invalid(name, "section is missing (run normalize first)"))
}

fn to_u32(field: &str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| invalid(field, format!("{value} is outside 0..={}", u32::MAX)))
}

fn to_pid(field: &str, value: i64) -> Result<u16> {
    match u16::try_from(value) {
        Ok(pid) if pid <= MAX_PID => Ok(pid),
        _ => Err(invalid(field, format!("{value} is not a 13-bit PID (0..=8191)"))),
    }
}

fn resolve_input(section: InputSection) -> Result<StreamEndpoint> {
    if section.kind == StreamKind::Srt {
        return Err(invalid("input.type", "srt is only supported as an output"));
    }
    if section.source.trim().is_empty() {
        return Err(invalid("input.source", "must not be empty"));
    }
    Ok(StreamEndpoint {
        kind: section.kind,
        address: section.source,
        srt: None,
        extra_params: Default::default(),
    })
}

fn resolve_output(section: OutputSection) -> Result<StreamEndpoint> {
    if section.kind == StreamKind::Hls {
        return Err(invalid("output.type", "hls is only supported as an input"));
    }
    if section.source.trim().is_empty() {
        let reason = match section.kind {
            StreamKind::Srt => "srt output needs a caller/listener address",
            _ => "must not be empty",
        };
        return Err(invalid("output.source", reason));
    }

    let srt = if section.kind == StreamKind::Srt {
        let latency_ms = section
            .latency_ms
            .map(|ms| to_u32("output.latency_ms", ms))
            .transpose()?;
        Some(SrtParams {
            mode: section.srt_mode,
            stream_id: section.stream_id,
            latency_ms,
        })
    } else {
        None
    };

    Ok(StreamEndpoint {
        kind: section.kind,
        address: section.source,
        srt,
        extra_params: section.extra_params,
    })
}

fn resolve_service(section: ServiceSection) -> Result<ServiceDescriptor> {
    let service_id = u16::try_from(section.service_id).map_err(|_| {
        invalid(
            "service.service_id",
            format!("{} does not fit in 16 bits", section.service_id),
        )
    })?;

    let video_pid = to_pid("service.video_pid", section.video_pid)?;
    let audio_pid = to_pid("service.audio_pid", section.audio_pid)?;
    let signal_pid = to_pid("service.signal_pid", section.signal_pid)?;
    let pcr_pid = to_pid("service.pcr_pid", section.pcr_pid)?;
    let null_pid = to_pid("service.null_pid", section.null_pid)?;

    if RESERVED_SIGNAL_PIDS.contains(&signal_pid) {
        return Err(invalid(
            "service.signal_pid",
            format!("{signal_pid:#06x} is reserved"),
        ));
    }
    if null_pid != MAX_PID {
        return Err(invalid(
            "service.null_pid",
            format!("null packets always use {MAX_PID:#06x}, got {null_pid:#06x}"),
        ));
    }

    for (name, pid) in [
        ("service.video_pid", video_pid),
        ("service.audio_pid", audio_pid),
        ("service.pcr_pid", pcr_pid),
    ] {
        if pid == null_pid {
            return Err(invalid(name, format!("PID {pid} is reserved for null packets")));
        }
    }

    let elementary = [
        ("service.video_pid", video_pid),
        ("service.audio_pid", audio_pid),
        ("service.signal_pid", signal_pid),
    ];
    for (i, (name_a, pid_a)) in elementary.iter().enumerate() {
        for (name_b, pid_b) in elementary.iter().skip(i + 1) {
            if pid_a == pid_b {
                return Err(invalid(
                    name_b,
                    format!("PID {pid_b} is already used by {name_a}"),
                ));
            }
        }
    }
    // PCR may ride on the video PID, but never on audio or signal.
    if pcr_pid == signal_pid || pcr_pid == audio_pid {
        return Err(invalid(
            "service.pcr_pid",
            format!("PID {pcr_pid} collides with an audio or signal PID"),
        ));
    }

    Ok(ServiceDescriptor {
        service_name: section.service_name,
        provider_name: section.provider_name,
        service_id,
        video_pid,
        audio_pid,
        signal_pid,
        pcr_pid,
        null_pid,
    })
}

fn resolve_signal(
    section: &SignalSection,
    injection: &InjectionSection,
    service: &ServiceDescriptor,
) -> Result<SignalSettings> {
    let ad_duration_seconds =
        to_u32("signal.ad_duration_seconds", section.ad_duration_seconds)?;
    let preroll_ms = to_u32("signal.preroll_ms", section.preroll_ms)?;

    // The longest break (preroll) must fit the 32-bit break_duration field.
    let longest = seconds_to_ticks(ad_duration_seconds) + ms_to_ticks(preroll_ms);
    if longest > u64::from(u32::MAX) {
        return Err(invalid(
            "signal.ad_duration_seconds",
            format!("{longest} ticks including preroll exceed the 32-bit break duration"),
        ));
    }

    Ok(SignalSettings {
        ad_duration_seconds,
        event_id: to_u32("signal.event_id", section.event_id)?,
        preroll_ms,
        unique_program_id: service.service_id,
        command: injection.command,
    })
}

fn resolve_injection(
    section: &InjectionSection,
    service: &ServiceDescriptor,
) -> Result<InjectionPolicy> {
    let repeat_count = to_u32("injection.repeat_count", section.repeat_count)?;
    if repeat_count == 0 {
        return Err(invalid("injection.repeat_count", "must be >= 1 (got 0)"));
    }

    let pts_reference_pid = match section.pts_pid {
        Some(pid) => to_pid("injection.pts_pid", pid)?,
        None => service.video_pid,
    };

    Ok(InjectionPolicy {
        target_pid: service.signal_pid,
        pts_reference_pid,
        repeat_count,
        repeat_interval_ms: to_u32("injection.repeat_interval_ms", section.repeat_interval_ms)?,
        start_delay_ms: to_u32("injection.start_delay_ms", section.start_delay_ms)?,
    })
}

fn resolve_engine(section: EngineSection) -> Result<EngineSettings> {
    if section.program.trim().is_empty() {
        return Err(invalid("engine.program", "must not be empty"));
    }
    Ok(EngineSettings {
        program: section.program,
        grace_period: Duration::from_millis(section.grace_period_ms),
        observe_window: Duration::from_millis(section.observe_window_ms),
        snapshot_interval: Duration::from_millis(section.snapshot_interval_ms.max(1)),
        marker_dir: section.marker_dir,
    })
}
