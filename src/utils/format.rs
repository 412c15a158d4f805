// src/utils/format.rs

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Short, single-unit duration label: `45s`, `15m`, `2h`, `3d`, `1w`.
///
/// Only the largest whole unit is kept, so 5400 seconds reads as `1h`.
/// Negative input is treated as zero.
pub fn short_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);

    if seconds >= WEEK {
        format!("{}w", seconds / WEEK)
    } else if seconds >= DAY {
        format!("{}d", seconds / DAY)
    } else if seconds >= HOUR {
        format!("{}h", seconds / HOUR)
    } else if seconds >= MINUTE {
        format!("{}m", seconds / MINUTE)
    } else {
        format!("{}s", seconds)
    }
}

/// Rounds to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
