// src/reports/mod.rs
pub mod csv_export;
pub mod docx_export;
pub mod filters;
pub mod pdf_export;
pub mod rows;

use chrono::FixedOffset;
use rusqlite::Connection;

use crate::db::complaints::scan_complaints;
use crate::errors::ServerError;

pub use filters::{ExportFormat, ReportFilters};
pub use rows::ReportRow;

/// A generated report: either rows for interactive display or a file.
#[derive(Debug)]
pub enum Report {
    Listing(Vec<ReportRow>),
    File {
        format: ExportFormat,
        bytes: Vec<u8>,
    },
}

impl Report {
    pub fn filename(&self) -> Option<&'static str> {
        match self {
            Report::Listing(_) => None,
            Report::File { format, .. } => Some(format.filename()),
        }
    }
}

/// Single query for every format.
pub fn report_rows(
    conn: &Connection,
    filters: &ReportFilters,
    offset: FixedOffset,
) -> Result<Vec<ReportRow>, ServerError> {
    let complaints = scan_complaints(conn, &filters.to_scan(offset))?;
    Ok(complaints
        .iter()
        .filter(|c| filters.matches_location(c))
        .map(|c| ReportRow::from_complaint(c, offset))
        .collect())
}

pub fn render(rows: Vec<ReportRow>, format: Option<ExportFormat>) -> Result<Report, ServerError> {
    let format = match format {
        None => return Ok(Report::Listing(rows)),
        Some(f) => f,
    };
    let bytes = match format {
        ExportFormat::Csv => csv_export::render_csv(&rows)?,
        ExportFormat::Pdf => pdf_export::render_pdf(&rows)?,
        ExportFormat::Word => docx_export::render_docx(&rows)?,
    };
    Ok(Report::File { format, bytes })
}

pub fn generate_report(
    conn: &Connection,
    filters: &ReportFilters,
    format: Option<ExportFormat>,
    offset: FixedOffset,
) -> Result<Report, ServerError> {
    let rows = report_rows(conn, filters, offset)?;
    render(rows, format)
}
