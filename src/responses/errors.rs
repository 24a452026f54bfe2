// src/responses/errors.rs
use astra::{Body, Response, ResponseBuilder};
use log::{error, warn};
use serde_json::{json, Value};

use crate::errors::ServerError;

fn error_body(err: &ServerError) -> (u16, Value) {
    match err {
        ServerError::Validation(fields) => (400, json!({ "error": "validation", "fields": fields })),
        ServerError::BadRequest(msg) => (400, json!({ "error": "bad_request", "message": msg })),
        ServerError::Unauthorized(msg) => (401, json!({ "error": "unauthorized", "message": msg })),
        ServerError::Forbidden(msg) => (403, json!({ "error": "forbidden", "message": msg })),
        ServerError::NotFound(msg) => (404, json!({ "error": "not_found", "message": msg })),
        ServerError::TerminalState { .. } => (
            409,
            json!({ "error": "terminal_state", "message": err.to_string() }),
        ),
        ServerError::DbError(_) | ServerError::ExportError(_) | ServerError::InternalError => (
            500,
            json!({ "error": "internal", "message": "Internal Server Error" }),
        ),
    }
}

/// Convert a ServerError into a JSON error response. Server-side failures
/// are logged with their detail; the client only sees a generic message.
pub fn error_to_response(err: ServerError) -> Response {
    let (status, body) = error_body(&err);
    if status >= 500 {
        error!("{err}");
    } else if status == 409 {
        warn!("{err}");
    }

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
