use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

// Fractional seconds are optional in all of these
const FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Accepts RFC 3339 (converted to UTC) and a few zone-less layouts, which are taken as-is.
pub fn parse_time(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    for fmt in FORMATS {
        if let Ok(time) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(time);
        }
    }
    bail!("Can't parse {:?} as a time", raw)
}

pub fn from_epoch_millis(millis: i64) -> Option<NaiveDateTime> {
    if millis == i64::MIN {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?.and_hms_opt(0, 0, 0)?;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// Fractional milliseconds from `t1` to `t2`, negative if `t2` is earlier
pub fn millis_between(t1: NaiveDateTime, t2: NaiveDateTime) -> f64 {
    let dt = t2 - t1;
    match dt.num_microseconds() {
        Some(us) => us as f64 / 1000.0,
        None => dt.num_milliseconds() as f64,
    }
}
