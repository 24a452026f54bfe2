// src/reports/rows.rs
use chrono::FixedOffset;
use serde::Serialize;

use crate::domain::complaint::Complaint;
use crate::domain::dates::local_date;

pub const HEADERS: [&str; 8] = [
    "ID",
    "Name",
    "Contact",
    "Email",
    "Location",
    "Status",
    "Created",
    "Description",
];

/// One report line, already rendered to text. Every export format reads
/// the same `Vec<ReportRow>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub id: i64,
    pub name: String,
    pub contact: String,
    pub email: String,
    pub location: String,
    pub status: String,
    pub created: String,
    pub description: String,
}

impl ReportRow {
    pub fn from_complaint(c: &Complaint, offset: FixedOffset) -> Self {
        ReportRow {
            id: c.id,
            name: c.name.clone().unwrap_or_default(),
            contact: c.contact.clone().unwrap_or_default(),
            email: c.email.clone().unwrap_or_default(),
            location: c.location.clone(),
            status: c.status.label().to_string(),
            created: local_date(c.created_at, offset).format("%Y-%m-%d").to_string(),
            description: c.description.clone(),
        }
    }

    /// Cells in `HEADERS` order.
    pub fn cells(&self) -> [String; 8] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.contact.clone(),
            self.email.clone(),
            self.location.clone(),
            self.status.clone(),
            self.created.clone(),
            self.description.clone(),
        ]
    }
}

#[cfg(test)]
pub(crate) fn sample_rows(n: usize) -> Vec<ReportRow> {
    (0..n)
        .map(|i| ReportRow {
            id: (n - i) as i64,
            name: if i % 2 == 0 { format!("Citizen {i}") } else { String::new() },
            contact: format!("07720{i:05}"),
            email: String::new(),
            location: format!("Kabale ward {}", i % 3),
            status: "Fixed".into(),
            created: "2024-05-01".into(),
            description: "Pipe burst near the market, water running for two days".into(),
        })
        .collect()
}
