// src/domain/status.rs

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::Serialize;

/// Lifecycle of a complaint. `Fixed` and `Closed` are terminal.
///
/// The short codes are what lives in the database and on the wire;
/// labels are what citizens and exports see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Status {
    #[serde(rename = "NEW")]
    New,
    #[serde(rename = "INP")]
    InProgress,
    #[serde(rename = "FIX")]
    Fixed,
    #[serde(rename = "CLO")]
    Closed,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::New,
        Status::InProgress,
        Status::Fixed,
        Status::Closed,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Status::New => "NEW",
            Status::InProgress => "INP",
            Status::Fixed => "FIX",
            Status::Closed => "CLO",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::New => "New",
            Status::InProgress => "In Progress",
            Status::Fixed => "Fixed",
            Status::Closed => "Closed",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Status::New => "NEW",
            Status::InProgress => "IN_PROGRESS",
            Status::Fixed => "FIXED",
            Status::Closed => "CLOSED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Fixed | Status::Closed)
    }

    pub fn from_code(code: &str) -> Option<Status> {
        Status::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Accepts the short code, the enum name or the label, ignoring case.
    pub fn parse(input: &str) -> Option<Status> {
        let input = input.trim();
        Status::ALL.into_iter().find(|s| {
            input.eq_ignore_ascii_case(s.code())
                || input.eq_ignore_ascii_case(s.name())
                || input.eq_ignore_ascii_case(s.label())
        })
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;
        Status::from_code(code).ok_or_else(|| {
            FromSqlError::Other(format!("unknown status code '{code}'").into())
        })
    }
}
