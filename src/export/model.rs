// src/export/model.rs

use crate::core::aggregate::{HistoryEntry, HistorySummary};
use crate::utils::time::{format_clock, ms_to_whole_minutes};

/// Column order is a compatibility contract; the break columns are the
/// optional block in the middle.
pub(crate) fn headers(include_breaks: bool) -> Vec<&'static str> {
    let mut cols = vec![
        "Serial No",
        "Date",
        "Sign In",
        "Sign Out",
        "Total Hours Worked",
    ];
    if include_breaks {
        cols.extend(["Total Break Time (min)", "Break In", "Break Out"]);
    }
    cols.extend(["Location", "Work Mode"]);
    cols
}

pub(crate) fn entry_to_row(entry: &HistoryEntry, include_breaks: bool) -> Vec<String> {
    let rec = &entry.record;
    let mut row = vec![
        entry.serial.to_string(),
        rec.date.format("%Y-%m-%d").to_string(),
        format_clock(rec.sign_in_at),
        format_clock(rec.sign_out_at),
        format!("{:.2}", rec.total_hours_worked),
    ];
    if include_breaks {
        row.push(ms_to_whole_minutes(rec.cumulative_break_duration_ms).to_string());
        row.push(format_clock(rec.break_in_at));
        row.push(format_clock(rec.break_out_at));
    }
    row.push(rec.location.clone());
    row.push(
        rec.work_mode
            .map(|m| m.label().to_string())
            .unwrap_or_else(|| "--".to_string()),
    );
    row
}

pub(crate) fn rows_to_table(entries: &[HistoryEntry], include_breaks: bool) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|e| entry_to_row(e, include_breaks))
        .collect()
}

pub(crate) fn summary_lines(summary: &HistorySummary) -> [String; 3] {
    [
        format!("Total Working Days: {}", summary.total_working_days),
        format!("Days Attended: {}", summary.days_attended),
        format!("Leaves Taken: {}", summary.leaves_taken),
    ]
}
