use log::info;
use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::ServerError;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// How long a writer waits on another worker's IMMEDIATE transaction.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// Thread-local connection slots, one per database path.
thread_local! {
    static DB_CONNS: RefCell<HashMap<String, Connection>> = RefCell::new(HashMap::new());
}

#[derive(Clone)]
pub struct Database {
    path: String,
}

impl Database {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Provides this worker thread's connection to the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ServerError>,
    {
        DB_CONNS
            .try_with(|cell| {
                let mut slots = cell.borrow_mut();
                if !slots.contains_key(&self.path) {
                    let conn = open_connection(&self.path)?;
                    slots.insert(self.path.clone(), conn);
                }
                let conn = slots.get_mut(&self.path).ok_or(ServerError::InternalError)?;
                f(conn)
            })
            .map_err(|_| ServerError::InternalError)?
    }
}

fn open_connection(path: &str) -> Result<Connection, ServerError> {
    let conn =
        Connection::open(path).map_err(|e| ServerError::DbError(format!("Open DB failed: {e}")))?;
    configure(&conn)?;
    Ok(conn)
}

/// Per-connection settings; SQLite does not persist these.
pub fn configure(conn: &Connection) -> Result<(), ServerError> {
    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|e| ServerError::DbError(format!("Set busy timeout failed: {e}")))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| ServerError::DbError(format!("Enable foreign keys failed: {e}")))?;
    Ok(())
}

/// Apply the bundled schema to a raw connection.
pub fn apply_schema(conn: &Connection) -> Result<(), ServerError> {
    conn.execute_batch(SCHEMA_SQL)
        .map_err(|e| ServerError::DbError(format!("Failed to apply schema: {e}")))
}

/// Initialize the database behind `db` (idempotent).
pub fn init_db(db: &Database) -> Result<(), ServerError> {
    db.with_conn(|conn| apply_schema(conn))?;
    info!("database initialized at {}", db.path());
    Ok(())
}

/// In-memory connection with the production schema, for unit tests.
#[cfg(test)]
pub fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    configure(&conn).unwrap();
    apply_schema(&conn).unwrap();
    conn
}
