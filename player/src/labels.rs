//! Text for a playback control panel.

use chrono::NaiveDateTime;

pub fn clock_label(time: Option<NaiveDateTime>) -> String {
    match time {
        Some(t) => t.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

pub fn date_time_label(time: Option<NaiveDateTime>) -> String {
    match time {
        Some(t) => t.format("%Y/%m/%d %H:%M:%S").to_string(),
        None => "--/--/-- --:--:--".to_string(),
    }
}

/// HH:MM:SS, rounding down to whole seconds. Nothing to play shows as `--:--:--`.
pub fn duration_label(duration: Option<chrono::Duration>) -> String {
    let total = match duration {
        Some(d) if d > chrono::Duration::zero() => d.num_seconds(),
        _ => return "--:--:--".to_string(),
    };
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

pub fn speed_label(speed: f64) -> String {
    format!("{}x", speed)
}
