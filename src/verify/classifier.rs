// src/verify/classifier.rs

use std::sync::LazyLock;

use regex::Regex;

/// Words whose presence in an engine log line suggests a splice marker
/// went through.
pub const MARKER_KEYWORDS: [&str; 6] = ["splice", "scte", "cue", "break", "insert", "time_signal"];

static KEYWORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(splice|scte|cue|break|insert|time_signal)").unwrap());

/// Decides whether a line of engine output looks like a marker trace.
///
/// Implementations are heuristics over text; a binary section decoder could
/// implement the same trait.
pub trait MarkerClassifier: Send + Sync {
    /// Returns the matched keyword for a positive line, `None` otherwise.
    fn classify(&self, line: &str) -> Option<&'static str>;
}

/// Case-insensitive keyword match over [`MARKER_KEYWORDS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl MarkerClassifier for KeywordClassifier {
    fn classify(&self, line: &str) -> Option<&'static str> {
        let found = KEYWORD_PATTERN.find(line)?.as_str().to_ascii_lowercase();
        MARKER_KEYWORDS.iter().copied().find(|k| *k == found)
    }
}

/// True when `line` names `pid` as a decimal or `0x` hex token.
pub fn mentions_pid(line: &str, pid: u16) -> bool {
    line.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .any(|token| {
            if let Ok(value) = token.parse::<u16>() {
                return value == pid;
            }
            let lower = token.to_ascii_lowercase();
            lower
                .strip_prefix("0x")
                .and_then(|hex| u16::from_str_radix(hex, 16).ok())
                .is_some_and(|value| value == pid)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_covers_every_keyword() {
        for keyword in MARKER_KEYWORDS {
            assert_eq!(KeywordClassifier.classify(keyword), Some(keyword));
        }
    }

    #[test]
    fn keywords_match_case_insensitively() {
        let c = KeywordClassifier::new();
        assert_eq!(c.classify("* spliceinject: injected SCTE-35 section"), Some("splice"));
        assert_eq!(c.classify("CUE-OUT detected"), Some("cue"));
        assert_eq!(c.classify("Time_Signal pts=1234"), Some("time_signal"));
        assert_eq!(c.classify("ad BREAK starting"), Some("break"));
    }

    #[test]
    fn unrelated_lines_are_negative() {
        let c = KeywordClassifier::new();
        assert_eq!(c.classify("tsp: bitrate 5,000,000 b/s"), None);
        assert_eq!(c.classify(""), None);
    }

    #[test]
    fn pid_mentions_in_decimal_and_hex() {
        assert!(mentions_pid("splice on PID 500 (0x01F4)", 500));
        assert!(mentions_pid("pid=0x01f4 splice_insert", 500));
        assert!(!mentions_pid("pid 5000 splice", 500));
        assert!(!mentions_pid("splice_insert", 500));
    }
}
