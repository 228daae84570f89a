use chrono::{DateTime, NaiveDateTime};

/// Round to two decimal places using the exact decimal value of `value`,
/// ties to even (`0.125` gives `0.12`, `0.375` gives `0.38`).
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// `value / max(floor, divisor)`, used wherever a count or distance may be zero.
pub fn floored_div(value: f64, divisor: f64, floor: f64) -> f64 {
    value / divisor.max(floor)
}

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a check-in timestamp. Naive forms are taken as-is; RFC 3339 values
/// with an offset are normalised to UTC so mixed offsets order by instant.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for fmt in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_utc())
}
