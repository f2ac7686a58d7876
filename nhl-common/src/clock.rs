//! Game clock arithmetic.
//!
//! Upstream feeds express time as `MM:SS` strings relative to the start of a
//! period. Everything downstream works in whole seconds.

use crate::{NhlError, Result};

/// Length of a regulation period in seconds.
pub const PERIOD_SECONDS: u32 = 20 * 60;

/// Elapsed game time assigned to every shootout attempt.
pub const SHOOTOUT_ELAPSED_SECONDS: u32 = 3900;

/// Convert `MM:SS` or `HH:MM:SS` into seconds. Blank input counts as zero.
pub fn clock_to_seconds(raw: &str) -> Result<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    let parts = raw
        .split(':')
        .map(|p| p.trim().parse::<u32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| NhlError::parse(format!("clock {raw:?}"), e))?;
    let total = match parts.as_slice() {
        [m, s] => m.checked_mul(60).and_then(|v| v.checked_add(*s)),
        [h, m, s] => h
            .checked_mul(3600)
            .and_then(|v| v.checked_add(m.checked_mul(60)?))
            .and_then(|v| v.checked_add(*s)),
        _ => {
            return Err(NhlError::parse(
                format!("clock {raw:?}"),
                "expected MM:SS or HH:MM:SS",
            ));
        }
    };
    total.ok_or_else(|| NhlError::parse(format!("clock {raw:?}"), "value out of range"))
}

pub fn seconds_to_clock(secs: u32, with_hours: bool) -> String {
    if with_hours {
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else {
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

/// Seconds since opening faceoff for a time `secs` into `period`.
/// Saturates at `u32::MAX`.
pub fn game_seconds(period: u8, secs: u32) -> u32 {
    u32::from(period.saturating_sub(1))
        .saturating_mul(PERIOD_SECONDS)
        .saturating_add(secs)
}

/// Period labels as printed in reports: `1`..`n`, `OT`, `SO`.
pub fn parse_period(label: &str) -> Result<u8> {
    let label = label.trim();
    match label.to_ascii_uppercase().as_str() {
        "OT" => Ok(4),
        "SO" => Ok(5),
        other => other
            .parse::<u8>()
            .map_err(|e| NhlError::parse(format!("period {label:?}"), e)),
    }
}
