// src/forms.rs
use astra::Request;
use std::collections::HashMap;
use std::io::Read;
use url::form_urlencoded;

use crate::errors::ServerError;

/// Upper bound on a form body; complaint text plus a photo reference fits
/// comfortably.
const MAX_FORM_BYTES: u64 = 64 * 1024;

pub fn parse_pairs(input: &[u8]) -> HashMap<String, String> {
    form_urlencoded::parse(input).into_owned().collect()
}

pub fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| parse_pairs(q.as_bytes()))
        .unwrap_or_default()
}

/// Read an `application/x-www-form-urlencoded` body.
pub fn read_form(req: &mut Request) -> Result<HashMap<String, String>, ServerError> {
    let mut buf = Vec::new();
    req.body_mut()
        .reader()
        .take(MAX_FORM_BYTES + 1)
        .read_to_end(&mut buf)
        .map_err(|e| ServerError::BadRequest(format!("could not read request body: {e}")))?;

    if buf.len() as u64 > MAX_FORM_BYTES {
        return Err(ServerError::BadRequest("request body too large".into()));
    }
    Ok(parse_pairs(&buf))
}

/// Query string merged with the form body; body values win.
pub fn read_params(req: &mut Request) -> Result<HashMap<String, String>, ServerError> {
    let mut params = parse_query(req);
    params.extend(read_form(req)?);
    Ok(params)
}

/// Positive integer id from a form field or path segment.
pub fn parse_id(field: &'static str, raw: Option<&str>) -> Result<i64, ServerError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ServerError::invalid(field, "This field is required."));
    }
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ServerError::invalid(field, "Enter a whole number."))
}
