// tests/config_files.rs
mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::fs;
use std::io::Write;

use tempfile::{tempdir, NamedTempFile};

use scte35_inject::config::{load, load_and_resolve, normalize, save, ConfigRecord};
use scte35_inject::errors::ConfigError;
use scte35_inject::types::StreamKind;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn missing_service_section_is_filled_with_defaults() -> TestResult {
    init_tracing();

    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[input]
type = "hls"
source = "https://example.com/live/master.m3u8"

[output]
type = "srt"
source = "10.0.0.5:9000"
stream_id = "ads-east"

[signal]
ad_duration_seconds = 120
event_id = 7
"#
    )?;

    let record = load(file.path())?;
    assert!(record.service.is_none());

    let normalized = normalize(record);
    let service = normalized.service.as_ref().expect("service filled");
    assert_eq!(service.service_id, 1);
    assert_eq!(service.video_pid, 256);
    assert_eq!(service.audio_pid, 257);
    assert_eq!(service.signal_pid, 500);
    assert_eq!(service.null_pid, 8191);
    assert_eq!(service.pcr_pid, 256);

    // Explicit sections survive untouched.
    let input = normalized.input.as_ref().unwrap();
    assert_eq!(input.kind, StreamKind::Hls);
    assert_eq!(normalized.signal.as_ref().unwrap().ad_duration_seconds, 120);
    assert_eq!(normalized.signal.as_ref().unwrap().preroll_ms, 0);
    Ok(())
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let err = load(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got {err:?}");
}

#[test]
fn invalid_toml_is_malformed_and_file_is_untouched() -> TestResult {
    let mut file = NamedTempFile::new()?;
    let garbage = "[input\ntype = ";
    write!(file, "{garbage}")?;

    let err = load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Malformed { .. }), "got {err:?}");
    assert_eq!(fs::read_to_string(file.path())?, garbage);
    Ok(())
}

#[test]
fn section_that_is_not_a_table_is_malformed() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(file, "service = 5\n")?;

    let err = load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Malformed { .. }), "got {err:?}");
    Ok(())
}

#[test]
fn invalid_pid_names_the_field() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[service]
service_name = "News"
provider_name = "Acme"
service_id = 1
video_pid = 256
audio_pid = 257
signal_pid = 8191
null_pid = 8191
pcr_pid = 256
"#
    )?;

    match load_and_resolve(file.path()) {
        Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "service.signal_pid"),
        other => panic!("expected Invalid, got {other:?}"),
    }
    Ok(())
}

#[test]
fn save_then_load_round_trips_and_leaves_no_temp_files() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let path = dir.path().join("scte35-inject.toml");
    fs::write(&path, "old contents that are not toml [")?;

    let record = normalize(ConfigRecord::default());
    save(&record, &path)?;

    assert_eq!(load(&path)?, record);

    let entries: Vec<_> = fs::read_dir(dir.path())?.collect::<Result<_, _>>()?;
    assert_eq!(entries.len(), 1, "only the config file should remain");
    Ok(())
}

#[test]
fn relative_marker_dir_resolves_against_config_dir() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("inject.toml");
    save(&normalize(ConfigRecord::default()), &path)?;

    let cfg = load_and_resolve(&path)?;
    assert_eq!(cfg.engine.marker_dir, dir.path().join("markers"));
    assert_eq!(cfg.engine.program, "tsp");
    Ok(())
}
