use crate::core::aggregate::HistoryReport;
use crate::errors::AppResult;
use crate::export::model::{headers, rows_to_table, summary_lines};
use csv::WriterBuilder;
use std::path::Path;

/// Writes the history rows followed by a blank row and the summary block.
pub(crate) fn export_csv(
    report: &HistoryReport,
    path: &Path,
    include_breaks: bool,
) -> AppResult<()> {
    // Flexible: the summary block is narrower than the data rows.
    let mut wtr = WriterBuilder::new().flexible(true).from_path(path)?;

    wtr.write_record(headers(include_breaks))?;

    for row in rows_to_table(&report.entries, include_breaks) {
        wtr.write_record(&row)?;
    }

    wtr.write_record([""])?;
    wtr.write_record(["Summary"])?;
    for line in summary_lines(&report.summary) {
        wtr.write_record([line])?;
    }

    wtr.flush()?;
    Ok(())
}
