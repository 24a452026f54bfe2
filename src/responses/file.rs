// src/responses/file.rs
use astra::{Body, ResponseBuilder};

use crate::errors::{ResultResp, ServerError};

/// Return a generated file as an attachment download.
pub fn file_response(buffer: Vec<u8>, filename: &str, content_type: &str) -> ResultResp {
    let resp = ResponseBuilder::new()
        .status(200)
        .header("Content-Type", content_type)
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(buffer))
        .map_err(|_| ServerError::InternalError)?;

    Ok(resp)
}
