use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Transport used by an input or output endpoint.
///
/// Not every kind is valid on both sides: `srt` is output-only and `hls` is
/// input-only. That is checked during validation, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Hls,
    Udp,
    Srt,
    File,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StreamKind::Hls => "hls",
            StreamKind::Udp => "udp",
            StreamKind::Srt => "srt",
            StreamKind::File => "file",
        };
        f.write_str(s)
    }
}

/// Which side initiates an SRT connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SrtMode {
    #[default]
    Caller,
    Listener,
}

/// Splice command flavour rendered for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpliceKind {
    #[default]
    Insert,
    TimeSignal,
}

/// What an injection request is trying to signal.
///
/// - `CueOut`: leave the network feed for an ad break of the configured length.
/// - `CueIn`: return to the network feed.
/// - `Preroll`: like `CueOut`, but the break also covers the preroll lead-in.
/// - `CrashOut`: emergency, immediate break of a short fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    CueOut,
    CueIn,
    Preroll,
    CrashOut,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::CueOut,
        PolicyKind::CueIn,
        PolicyKind::Preroll,
        PolicyKind::CrashOut,
    ];
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PolicyKind::CueOut => "cue-out",
            PolicyKind::CueIn => "cue-in",
            PolicyKind::Preroll => "preroll",
            PolicyKind::CrashOut => "crash-out",
        };
        f.write_str(s)
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "cue-out" => Ok(PolicyKind::CueOut),
            "cue-in" => Ok(PolicyKind::CueIn),
            "preroll" => Ok(PolicyKind::Preroll),
            "crash-out" => Ok(PolicyKind::CrashOut),
            other => Err(format!(
                "invalid policy kind: {other} (expected cue-out, cue-in, preroll or crash-out)"
            )),
        }
    }
}
