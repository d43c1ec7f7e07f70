//! Stand-ins for the external engine, built from `sh -c` scripts.

/// argv running `script` under `sh -c`.
pub fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}

/// Prints a few splice-looking lines for `pid`, then idles for `idle_secs`.
pub fn chatty_engine(pid: u16, idle_secs: u32) -> Vec<String> {
    sh(&format!(
        "echo 'tsp: starting'; \
         echo '* spliceinject: PID {pid} (0x{pid:04X}) splice_insert queued'; \
         echo 'bitrate 5000000 b/s' 1>&2; \
         echo '* spliceinject: SCTE-35 section injected on pid {pid}' 1>&2; \
         sleep {idle_secs}"
    ))
}

/// Ignores SIGTERM, so only a forced kill ends it.
pub fn stubborn_engine() -> Vec<String> {
    sh("trap '' TERM; while true; do sleep 0.1; done")
}

/// Exits straight away with `code`.
pub fn crashing_engine(code: i32) -> Vec<String> {
    sh(&format!("exit {code}"))
}

/// Write an executable `/bin/sh` script standing in for the engine binary.
///
/// Unlike the `sh -c` helpers this can be used as `engine.program`, since it
/// accepts (and may echo) the full plugin argument list.
#[cfg(unix)]
pub fn write_engine_script(
    dir: &std::path::Path,
    name: &str,
    body: &str,
) -> std::io::Result<std::path::PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
}
