// src/router.rs
use astra::{Request, Response};
use serde_json::json;

use crate::app::App;
use crate::errors::{ResultResp, ServerError};
use crate::forms::{parse_id, parse_query, read_form, read_params};
use crate::reports::Report;
use crate::responses::{error_to_response, file_response, json_response};
use crate::service;

/// Entry point used by the server loop: errors become JSON error responses.
pub fn respond(req: Request, app: &App) -> Response {
    handle(req, app).unwrap_or_else(error_to_response)
}

pub fn handle(mut req: Request, app: &App) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let actor = app.identity.identify(&req, &app.db)?;

    match (method.as_str(), segments.as_slice()) {
        ("POST", ["complaints"]) => {
            let form = read_form(&mut req)?;
            let receipt = service::submit_complaint(app, &actor, &form)?;
            json_response(201, &receipt)
        }

        ("GET", ["lookup"]) | ("POST", ["lookup"]) => {
            let params = read_params(&mut req)?;
            let found = service::lookup_status(app, &actor, &params)?;
            json_response(200, &found)
        }

        ("GET", ["complaints", id]) => {
            let id = complaint_id(id)?;
            let detail = service::complaint_detail(app, &actor, id)?;
            json_response(200, &detail)
        }

        ("POST", ["complaints", id, "status"]) => {
            let id = complaint_id(id)?;
            let form = read_form(&mut req)?;
            let outcome = service::update_status(app, &actor, id, &form)?;
            json_response(
                200,
                &json!({ "complaint": outcome.complaint, "update": outcome.update }),
            )
        }

        ("POST", ["admin", "assign"]) => {
            let form = read_form(&mut req)?;
            let outcome = service::assign_complaint(app, &actor, &form)?;
            let message = outcome
                .assignee
                .as_ref()
                .map(|t| format!("Complaint #{} assigned to {}.", outcome.complaint.id, t.username));
            json_response(
                200,
                &json!({
                    "complaint": outcome.complaint,
                    "update": outcome.update,
                    "assignee": outcome.assignee,
                    "message": message,
                }),
            )
        }

        ("GET", ["admin"]) => {
            let triage = service::admin_triage(app, &actor, &parse_query(&req))?;
            json_response(200, &triage)
        }

        ("GET", ["technician"]) => {
            let dashboard = service::technician_dashboard(app, &actor)?;
            json_response(200, &dashboard)
        }

        ("GET", ["metrics"]) => {
            let metrics = service::global_dashboard(app, &actor)?;
            json_response(200, &metrics)
        }

        ("GET", ["reports"]) => match service::report(app, &actor, &parse_query(&req))? {
            Report::Listing(rows) => json_response(200, &json!({ "count": rows.len(), "rows": rows })),
            Report::File { format, bytes } => {
                file_response(bytes, format.filename(), format.content_type())
            }
        },

        _ => Err(ServerError::NotFound(format!("No route for {method} {path}"))),
    }
}

fn complaint_id(raw: &str) -> Result<i64, ServerError> {
    parse_id("id", Some(raw)).map_err(|_| ServerError::NotFound("Complaint not found.".into()))
}
