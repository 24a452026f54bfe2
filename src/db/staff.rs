// src/db/staff.rs
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::auth::Role;
use crate::errors::ServerError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffMember {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
    pub created_at: i64,
}

const STAFF_COLUMNS: &str = "id, username, email, role, created_at";

fn map_staff(row: &Row<'_>) -> rusqlite::Result<StaffMember> {
    let role: String = row.get(3)?;
    Ok(StaffMember {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        role: Role::parse_staff(&role).unwrap_or(Role::Citizen),
        created_at: row.get(4)?,
    })
}

pub fn insert_staff(
    conn: &Connection,
    username: &str,
    role: Role,
    email: Option<&str>,
    token_hash: &[u8],
    now: i64,
) -> Result<StaffMember, ServerError> {
    conn.execute(
        "insert into staff (username, email, role, token_hash, created_at) values (?, ?, ?, ?, ?)",
        params![username, email, role.as_str(), token_hash, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert staff failed: {e}")))?;

    Ok(StaffMember {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
        email: email.map(str::to_string),
        role,
        created_at: now,
    })
}

pub fn find_by_token_hash(
    conn: &Connection,
    token_hash: &[u8],
) -> Result<Option<StaffMember>, ServerError> {
    conn.query_row(
        &format!("select {STAFF_COLUMNS} from staff where token_hash = ?"),
        params![token_hash],
        map_staff,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("staff token lookup failed: {e}")))
}

pub fn get_staff(conn: &Connection, id: i64) -> Result<Option<StaffMember>, ServerError> {
    conn.query_row(
        &format!("select {STAFF_COLUMNS} from staff where id = ?"),
        params![id],
        map_staff,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select staff failed: {e}")))
}

/// Only members holding the technician role can take assignments.
pub fn get_technician(conn: &Connection, id: i64) -> Result<Option<StaffMember>, ServerError> {
    Ok(get_staff(conn, id)?.filter(|m| m.role == Role::Technician))
}

pub fn list_technicians(conn: &Connection) -> Result<Vec<StaffMember>, ServerError> {
    let mut stmt = conn
        .prepare(&format!(
            "select {STAFF_COLUMNS} from staff where role = 'technician' order by username"
        ))
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map([], map_staff)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}
