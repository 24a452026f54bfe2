// src/reports/csv_export.rs
use crate::errors::ServerError;
use crate::reports::rows::{ReportRow, HEADERS};

pub fn render_csv(rows: &[ReportRow]) -> Result<Vec<u8>, ServerError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(HEADERS)
        .map_err(|e| ServerError::ExportError(format!("Failed to write CSV header: {e}")))?;

    for row in rows {
        writer
            .write_record(row.cells())
            .map_err(|e| ServerError::ExportError(format!("Failed to write CSV row {}: {e}", row.id)))?;
    }

    writer
        .into_inner()
        .map_err(|e| ServerError::ExportError(format!("Failed to flush CSV: {e}")))
}
