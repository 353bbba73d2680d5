//! Time utilities: millisecond/hour conversions and clock formatting for
//! record projections.

use chrono::{DateTime, Local, Timelike};

pub const MS_PER_HOUR: f64 = 3_600_000.0;
pub const MS_PER_MINUTE: i64 = 60_000;

pub fn ms_to_hours(ms: i64) -> f64 {
    if ms <= 0 { 0.0 } else { ms as f64 / MS_PER_HOUR }
}

pub fn ms_to_whole_minutes(ms: i64) -> i64 {
    if ms <= 0 { 0 } else { ms / MS_PER_MINUTE }
}

/// Renders a timestamp as "09:00 AM"; absent timestamps render "--:--".
pub fn format_clock(ts: Option<DateTime<Local>>) -> String {
    match ts {
        Some(t) => t.format("%I:%M %p").to_string(),
        None => "--:--".to_string(),
    }
}

/// True while the local wall clock sits in the once-a-day closure window
/// just past midnight.
pub fn in_midnight_window(now: DateTime<Local>, window_minutes: u32) -> bool {
    now.hour() == 0 && now.minute() < window_minutes
}
