// src/db/complaints.rs
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};

use crate::domain::complaint::{Complaint, NewComplaint};
use crate::domain::status::Status;
use crate::errors::ServerError;

const COMPLAINT_COLUMNS: &str =
    "id, name, contact, email, location, description, photo, created_at, status, assigned_to";

fn map_complaint(row: &Row<'_>) -> rusqlite::Result<Complaint> {
    Ok(Complaint {
        id: row.get(0)?,
        name: row.get(1)?,
        contact: row.get(2)?,
        email: row.get(3)?,
        location: row.get(4)?,
        description: row.get(5)?,
        photo: row.get(6)?,
        created_at: row.get(7)?,
        status: row.get(8)?,
        assigned_to: row.get(9)?,
    })
}

/// Result ordering for scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanOrder {
    /// Most recent first; the report and dashboard order.
    #[default]
    NewestFirst,
    /// Grouped by status code, most recent first within a group.
    StatusThenNewest,
}

/// Filters understood by the store itself. Substring matching on free text
/// happens in Rust so that case folding is not limited to ASCII.
#[derive(Debug, Clone, Default)]
pub struct ComplaintScan {
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<i64>,
    /// Exclusive upper bound on `created_at`.
    pub created_before: Option<i64>,
    pub status: Option<Status>,
    pub statuses: Vec<Status>,
    pub assigned_to: Option<i64>,
    pub assigned_only: bool,
    pub order: ScanOrder,
}

pub fn insert_complaint(
    conn: &Connection,
    new: &NewComplaint,
    now: i64,
) -> Result<Complaint, ServerError> {
    conn.execute(
        r#"
        insert into complaints (name, contact, email, location, description, photo, created_at, status)
        values (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            new.name,
            new.contact,
            new.email,
            new.location,
            new.description,
            new.photo,
            now,
            Status::New,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert complaint failed: {e}")))?;

    Ok(Complaint {
        id: conn.last_insert_rowid(),
        name: new.name.clone(),
        contact: new.contact.clone(),
        email: new.email.clone(),
        location: new.location.clone(),
        description: new.description.clone(),
        photo: new.photo.clone(),
        created_at: now,
        status: Status::New,
        assigned_to: None,
    })
}

pub fn get_complaint(conn: &Connection, id: i64) -> Result<Option<Complaint>, ServerError> {
    conn.query_row(
        &format!("select {COMPLAINT_COLUMNS} from complaints where id = ?"),
        params![id],
        map_complaint,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select complaint failed: {e}")))
}

/// Citizen lookup: both the id and the contact given at submission must match.
pub fn find_by_id_and_contact(
    conn: &Connection,
    id: i64,
    contact: &str,
) -> Result<Option<Complaint>, ServerError> {
    conn.query_row(
        &format!("select {COMPLAINT_COLUMNS} from complaints where id = ? and contact = ?"),
        params![id, contact],
        map_complaint,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("lookup complaint failed: {e}")))
}

/// Mirror a transition onto the current-state columns. The terminal guard
/// makes the write a no-op (0 rows) if the row was closed in between.
pub fn set_status_and_assignee(
    conn: &Connection,
    id: i64,
    status: Status,
    assigned_to: Option<i64>,
) -> Result<usize, ServerError> {
    conn.execute(
        "update complaints set status = ?, assigned_to = ? where id = ? and status not in ('FIX', 'CLO')",
        params![status, assigned_to, id],
    )
    .map_err(|e| ServerError::DbError(format!("update complaint failed: {e}")))
}

#[cfg(test)]
pub fn delete_complaint(conn: &Connection, id: i64) -> Result<bool, ServerError> {
    let n = conn
        .execute("delete from complaints where id = ?", params![id])
        .map_err(|e| ServerError::DbError(format!("delete complaint failed: {e}")))?;
    Ok(n == 1)
}

/// Filtered scan with ordering.
pub fn scan_complaints(
    conn: &Connection,
    scan: &ComplaintScan,
) -> Result<Vec<Complaint>, ServerError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(from) = scan.created_from {
        clauses.push("created_at >= ?".into());
        args.push(Box::new(from));
    }
    if let Some(before) = scan.created_before {
        clauses.push("created_at < ?".into());
        args.push(Box::new(before));
    }
    if let Some(status) = scan.status {
        clauses.push("status = ?".into());
        args.push(Box::new(status));
    }
    if !scan.statuses.is_empty() {
        let marks = vec!["?"; scan.statuses.len()].join(", ");
        clauses.push(format!("status in ({marks})"));
        for s in &scan.statuses {
            args.push(Box::new(*s));
        }
    }
    if let Some(tech) = scan.assigned_to {
        clauses.push("assigned_to = ?".into());
        args.push(Box::new(tech));
    }
    if scan.assigned_only {
        clauses.push("assigned_to is not null".into());
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" where {}", clauses.join(" and "))
    };
    let order_sql = match scan.order {
        ScanOrder::NewestFirst => "created_at desc, id desc",
        ScanOrder::StatusThenNewest => "status asc, created_at desc, id desc",
    };

    let sql = format!("select {COMPLAINT_COLUMNS} from complaints{where_sql} order by {order_sql}");

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map(params_from_iter(args.iter()), map_complaint)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}
