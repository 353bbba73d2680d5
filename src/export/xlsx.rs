// src/export/xlsx.rs

use crate::core::aggregate::HistoryReport;
use crate::errors::{AppError, AppResult};
use crate::export::model::{headers, rows_to_table, summary_lines};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook};
use std::io;
use std::path::Path;
use unicode_width::UnicodeWidthStr;

/// Styled XLSX export: colored header, banded rows, frozen header row,
/// auto column widths, then the summary block.
pub(crate) fn export_xlsx(
    report: &HistoryReport,
    path: &Path,
    include_breaks: bool,
) -> AppResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    // ---------------------------
    // Header
    // ---------------------------
    let cols = headers(include_breaks);

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x1565C0))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in cols.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *header, &header_format)
            .map_err(to_io_app_error)?;
    }

    worksheet.set_freeze_panes(1, 0).ok();

    let mut col_widths: Vec<usize> = cols.iter().map(|h| UnicodeWidthStr::width(*h)).collect();

    let band1 = Color::RGB(0xF1F8E9);
    let band2 = Color::RGB(0xFFFFFF);

    // ---------------------------
    // Data rows
    // ---------------------------
    let table = rows_to_table(&report.entries, include_breaks);
    for (row_index, values) in table.iter().enumerate() {
        let row = (row_index + 1) as u32;
        let band_color = if row_index % 2 == 0 { band1 } else { band2 };

        for (col, value) in values.iter().enumerate() {
            write_cell(worksheet, row, col as u16, value, band_color)?;
            col_widths[col] = col_widths[col].max(UnicodeWidthStr::width(value.as_str()));
        }
    }

    // ---------------------------
    // Summary block
    // ---------------------------
    let summary_title = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xFFF3E0))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Medium);
    let summary_body = Format::new()
        .set_background_color(Color::RGB(0xFFF8E1))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    let mut row = table.len() as u32 + 2; // one blank row after the data
    worksheet
        .write_with_format(row, 0, "Summary", &summary_title)
        .map_err(to_io_app_error)?;
    for line in summary_lines(&report.summary) {
        row += 1;
        worksheet
            .write_with_format(row, 0, line.as_str(), &summary_body)
            .map_err(to_io_app_error)?;
        col_widths[0] = col_widths[0].max(UnicodeWidthStr::width(line.as_str()));
    }

    // ---------------------------
    // Column widths
    // ---------------------------
    for (c, w) in col_widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, *w as f64 + 2.0)
            .map_err(to_io_app_error)?;
    }

    workbook.save(path_str(path)?).map_err(to_io_app_error)?;
    Ok(())
}

/// Writes one cell, right-aligning values that parse as numbers.
fn write_cell(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    s: &str,
    bg: Color,
) -> AppResult<()> {
    if let Ok(num) = s.parse::<f64>() {
        let fmt = Format::new()
            .set_align(FormatAlign::Right)
            .set_background_color(bg)
            .set_pattern(FormatPattern::Solid)
            .set_border(FormatBorder::Thin);

        worksheet
            .write_with_format(row, col, num, &fmt)
            .map_err(to_io_app_error)?;
        return Ok(());
    }

    let fmt = Format::new()
        .set_background_color(bg)
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    worksheet
        .write_with_format(row, col, s, &fmt)
        .map_err(to_io_app_error)?;

    Ok(())
}

fn to_io_app_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::from(io::Error::other(e.to_string()))
}

fn path_str(path: &Path) -> AppResult<&str> {
    path.to_str()
        .ok_or_else(|| AppError::from(io::Error::other("invalid path")))
}
