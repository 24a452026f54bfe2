// errors.rs
use astra::Response;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::status::Status;

/// Field name -> human readable message, in stable order for responses.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Errors originating from either the server logic
/// (routing, missing resources, rejected transitions) or downstream layers (DB, exports).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("Complaint #{id} is already {} and {action}.", .status.label())]
    TerminalState {
        id: i64,
        status: Status,
        action: &'static str,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database Error: {0}")]
    DbError(String),

    #[error("Export Error: {0}")]
    ExportError(String),

    #[error("Internal Server Error")]
    InternalError,
}

impl ServerError {
    /// Single-field validation failure.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field, message.into());
        ServerError::Validation(fields)
    }
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;
