// src/db/status_updates.rs
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashMap;

use crate::domain::complaint::StatusUpdate;
use crate::domain::status::Status;
use crate::errors::ServerError;

/// Complaint id -> its updates in creation order.
pub type History = HashMap<i64, Vec<StatusUpdate>>;

fn map_update(row: &Row<'_>) -> rusqlite::Result<StatusUpdate> {
    Ok(StatusUpdate {
        id: row.get(0)?,
        complaint_id: row.get(1)?,
        status: row.get(2)?,
        comment: row.get(3)?,
        timestamp: row.get(4)?,
    })
}

/// Append one history entry. History is never edited or deleted.
pub fn append_update(
    conn: &Connection,
    complaint_id: i64,
    status: Status,
    comment: &str,
    now: i64,
) -> Result<StatusUpdate, ServerError> {
    conn.execute(
        "insert into status_updates (complaint_id, status, comment, timestamp) values (?, ?, ?, ?)",
        params![complaint_id, status, comment, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert status update failed: {e}")))?;

    Ok(StatusUpdate {
        id: conn.last_insert_rowid(),
        complaint_id,
        status,
        comment: comment.to_string(),
        timestamp: now,
    })
}

pub fn list_updates(conn: &Connection, complaint_id: i64) -> Result<Vec<StatusUpdate>, ServerError> {
    let mut stmt = conn
        .prepare(
            "select id, complaint_id, status, comment, timestamp from status_updates where complaint_id = ? order by id",
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map(params![complaint_id], map_update)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

/// Histories for a set of complaints in one query.
pub fn histories_for(conn: &Connection, complaint_ids: &[i64]) -> Result<History, ServerError> {
    let mut history = History::new();
    if complaint_ids.is_empty() {
        return Ok(history);
    }

    // Batched to stay under SQLite's bound-parameter limit.
    for chunk in complaint_ids.chunks(500) {
        let marks = vec!["?"; chunk.len()].join(", ");
        let sql = format!(
            "select id, complaint_id, status, comment, timestamp from status_updates where complaint_id in ({marks}) order by complaint_id, id"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map(params_from_iter(chunk.iter()), map_update)
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        for r in rows {
            let update = r.map_err(|e| ServerError::DbError(e.to_string()))?;
            history.entry(update.complaint_id).or_default().push(update);
        }
    }
    Ok(history)
}

#[cfg(test)]
pub fn count_updates(conn: &Connection, complaint_id: i64) -> Result<i64, ServerError> {
    conn.query_row(
        "select count(*) from status_updates where complaint_id = ?",
        params![complaint_id],
        |r| r.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("count status updates failed: {e}")))
}
