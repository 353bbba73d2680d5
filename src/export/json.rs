use crate::core::aggregate::{HistoryReport, HistorySummary};
use crate::errors::{AppError, AppResult};
use crate::models::record::AttendanceDayRecord;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Serialize)]
struct JsonReport<'a> {
    records: Vec<&'a AttendanceDayRecord>,
    summary: &'a HistorySummary,
}

pub(crate) fn export_json(report: &HistoryReport, path: &Path) -> AppResult<()> {
    let payload = JsonReport {
        records: report.entries.iter().map(|e| &e.record).collect(),
        summary: &report.summary,
    };

    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &payload)
        .map_err(|e| AppError::Export(e.to_string()))?;
    Ok(())
}
