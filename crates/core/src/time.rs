use chrono::{DateTime, TimeZone, Utc};

/// Convert a unix-nanosecond timestamp to a UTC datetime.
pub fn nanos_to_dt(nanos: u64) -> DateTime<Utc> {
    let secs = (nanos / 1_000_000_000) as i64;
    let subnanos = (nanos % 1_000_000_000) as u32;
    Utc.timestamp_opt(secs, subnanos).single().unwrap_or_default()
}

/// Render a nanosecond duration with a magnitude-appropriate unit, e.g.
/// "1.50ms", "980µs", "2.30s".
pub fn format_duration_nanos(nanos: u64) -> String {
    const UNITS: &[(u64, &str)] = &[
        (1_000_000_000, "s"),
        (1_000_000, "ms"),
        (1_000, "µs"),
    ];

    for &(scale, unit) in UNITS {
        if nanos >= scale {
            let value = nanos as f64 / scale as f64;
            return if value >= 100.0 {
                format!("{value:.0}{unit}")
            } else if value >= 10.0 {
                format!("{value:.1}{unit}")
            } else {
                format!("{value:.2}{unit}")
            };
        }
    }
    format!("{nanos}ns")
}
