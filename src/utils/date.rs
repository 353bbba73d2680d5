use chrono::{Datelike, NaiveDate, Weekday};

pub fn all_days_of_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let Some(mut d) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return out;
    };

    while d.month() == month {
        out.push(d);
        d = match d.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    out
}

pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub fn last_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    all_days_of_month(year, month).last().copied()
}

pub fn is_weekday(d: NaiveDate) -> bool {
    !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Count of Monday-Friday dates in `[start, end]` inclusive.
/// Returns 0 when `start > end`.
pub fn working_days_between(start: NaiveDate, end: NaiveDate) -> u32 {
    let mut count = 0;
    let mut d = start;

    while d <= end {
        if is_weekday(d) {
            count += 1;
        }
        d = match d.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    count
}
