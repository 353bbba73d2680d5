//! History export: writes an aggregated history report to CSV, JSON or
//! styled XLSX with the fixed column order and trailing summary block the
//! portal's report consumers expect.

pub mod csv;
pub mod json;
pub mod model;
pub mod xlsx;

use crate::core::aggregate::HistoryReport;
use crate::errors::{AppError, AppResult};
use std::io;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
}

impl std::str::FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(AppError::InvalidExportFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Adds the Total Break Time / Break In / Break Out columns.
    pub include_break_columns: bool,
    /// Overwrite an existing output file.
    pub force: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_break_columns: true,
            force: false,
        }
    }
}

/// Write `report` to `path` in the requested format.
pub fn export_history(
    report: &HistoryReport,
    format: ExportFormat,
    path: &Path,
    options: &ExportOptions,
) -> AppResult<()> {
    ensure_writable(path, options.force)?;

    match format {
        ExportFormat::Csv => csv::export_csv(report, path, options.include_break_columns)?,
        ExportFormat::Json => json::export_json(report, path)?,
        ExportFormat::Xlsx => xlsx::export_xlsx(report, path, options.include_break_columns)?,
    }

    info!(path = %path.display(), rows = report.entries.len(), "history exported");
    Ok(())
}

fn ensure_writable(path: &Path, force: bool) -> AppResult<()> {
    if path.exists() && !force {
        return Err(AppError::from(io::Error::other(format!(
            "Output file already exists (use force to overwrite): {}",
            path.display()
        ))));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        return Err(AppError::from(io::Error::other(format!(
            "Output directory does not exist: {}",
            parent.display()
        ))));
    }
    Ok(())
}
