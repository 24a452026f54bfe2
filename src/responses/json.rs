// src/responses/json.rs
use astra::{Body, ResponseBuilder};
use serde::Serialize;

use crate::errors::{ResultResp, ServerError};

pub fn json_response<T: Serialize>(status: u16, value: &T) -> ResultResp {
    let body = serde_json::to_vec(value)
        .map_err(|e| ServerError::ExportError(format!("JSON encoding failed: {e}")))?;

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .map_err(|_| ServerError::InternalError)
}
