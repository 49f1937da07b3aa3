//! Human-readable byte counts and durations.

use std::time::Duration;

const UNITS: [&str; 9] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi", "Yi"];

/// Format a byte count with binary (IEC) units, rounded to two decimals.
///
/// Trailing zeros are dropped, so exactly one kibibyte renders as `1 KiB`.
pub fn format_bytes(bytes: f64) -> String {
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}B", rounded, UNITS[unit])
}

/// Format a duration using its largest reached unit, rounded up.
pub fn format_duration(duration: Duration) -> String {
    const DAY: f64 = 86_400_000.0;
    const HOUR: f64 = 3_600_000.0;
    const MINUTE: f64 = 60_000.0;
    const SECOND: f64 = 1_000.0;

    let ms = duration.as_secs_f64() * 1000.0;
    if ms >= DAY {
        format!("{}d", (ms / DAY).ceil())
    } else if ms >= HOUR {
        format!("{}h", (ms / HOUR).ceil())
    } else if ms >= MINUTE {
        format!("{}m", (ms / MINUTE).ceil())
    } else if ms >= SECOND {
        format!("{}s", (ms / SECOND).ceil())
    } else {
        format!("{}ms", ms.ceil())
    }
}
