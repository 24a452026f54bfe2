// src/reports/filters.rs
use chrono::{FixedOffset, NaiveDate};
use std::collections::HashMap;

use crate::db::complaints::{ComplaintScan, ScanOrder};
use crate::domain::complaint::Complaint;
use crate::domain::dates::{local_end_of_day, local_midnight};
use crate::domain::status::Status;
use crate::errors::{FieldErrors, ServerError};

/// Report filters; all optional and AND-combined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<Status>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
    Word,
}

impl ExportFormat {
    /// Unknown values fall through to the interactive listing.
    pub fn parse(value: &str) -> Option<ExportFormat> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "pdf" => Some(ExportFormat::Pdf),
            "word" | "docx" => Some(ExportFormat::Word),
            _ => None,
        }
    }

    /// `format=...`, or the older `export=...`.
    pub fn from_params(params: &HashMap<String, String>) -> Option<ExportFormat> {
        params
            .get("format")
            .or_else(|| params.get("export"))
            .and_then(|v| ExportFormat::parse(v))
    }

    pub fn filename(self) -> &'static str {
        match self {
            ExportFormat::Csv => "complaints_report.csv",
            ExportFormat::Pdf => "complaints_report.pdf",
            ExportFormat::Word => "complaints_report.docx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

fn non_empty<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_date(
    params: &HashMap<String, String>,
    field: &'static str,
    errors: &mut FieldErrors,
) -> Option<NaiveDate> {
    let raw = non_empty(params, field)?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            errors.insert(field, "Enter a valid date (YYYY-MM-DD).".into());
            None
        }
    }
}

impl ReportFilters {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ServerError> {
        let mut errors = FieldErrors::new();

        let start_date = parse_date(params, "start_date", &mut errors);
        let end_date = parse_date(params, "end_date", &mut errors);

        let status = match non_empty(params, "status") {
            None => None,
            Some(raw) => {
                let parsed = Status::parse(raw);
                if parsed.is_none() {
                    errors.insert(
                        "status",
                        format!("Select a valid choice. {raw} is not one of the available choices."),
                    );
                }
                parsed
            }
        };

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                errors.insert("end_date", "End date must not be before start date.".into());
            }
        }

        if !errors.is_empty() {
            return Err(ServerError::Validation(errors));
        }

        Ok(ReportFilters {
            start_date,
            end_date,
            status,
            location: non_empty(params, "location").map(str::to_string),
        })
    }

    /// The part of the filter the store evaluates: date bounds in the
    /// utility's local calendar, exact status, newest first.
    pub fn to_scan(&self, offset: FixedOffset) -> ComplaintScan {
        ComplaintScan {
            created_from: self.start_date.map(|d| local_midnight(d, offset)),
            created_before: self.end_date.map(|d| local_end_of_day(d, offset)),
            status: self.status,
            order: ScanOrder::NewestFirst,
            ..Default::default()
        }
    }

    /// Case-insensitive location substring; passes everything when unset.
    pub fn matches_location(&self, complaint: &Complaint) -> bool {
        match &self.location {
            None => true,
            Some(needle) => complaint
                .location
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}
