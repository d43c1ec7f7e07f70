// src/splice/pts.rs

//! 90 kHz presentation-timestamp helpers.

use std::time::{SystemTime, UNIX_EPOCH};

pub const TICKS_PER_SECOND: u64 = 90_000;
pub const TICKS_PER_MS: u64 = 90;

/// PTS values are 33-bit and wrap around roughly every 26.5 hours.
pub const PTS_MASK: u64 = (1 << 33) - 1;

/// Current wall-clock time as a wrapped 90 kHz tick count.
pub fn now_pts() -> u64 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let ticks = elapsed.as_secs() * TICKS_PER_SECOND
        + u64::from(elapsed.subsec_micros()) * TICKS_PER_SECOND / 1_000_000;
    ticks & PTS_MASK
}

pub fn seconds_to_ticks(secs: u32) -> u64 {
    u64::from(secs) * TICKS_PER_SECOND
}

pub fn ms_to_ticks(ms: u32) -> u64 {
    u64::from(ms) * TICKS_PER_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_pts_fits_in_33_bits() {
        assert!(now_pts() <= PTS_MASK);
    }

    #[test]
    fn conversions() {
        assert_eq!(seconds_to_ticks(600), 54_000_000);
        assert_eq!(ms_to_ticks(1_500), 135_000);
    }
}
