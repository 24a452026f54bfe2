// src/service.rs
//! Operations behind the HTTP routes. Each one checks the caller's
//! capability first, does its storage work, and only then notifies.

use log::info;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::App;
use crate::auth::{Actor, Capability, Role};
use crate::db::complaints::{
    find_by_id_and_contact, get_complaint, insert_complaint, scan_complaints, ComplaintScan,
    ScanOrder,
};
use crate::db::staff::{get_staff, list_technicians, StaffMember};
use crate::db::status_updates::{histories_for, list_updates};
use crate::domain::complaint::{Complaint, NewComplaint, StatusUpdate};
use crate::domain::metrics::{global_metrics, technician_metrics, GlobalMetrics, TechnicianMetrics};
use crate::domain::status::Status;
use crate::domain::transition::{apply_transition, Transition, TransitionOutcome};
use crate::errors::{FieldErrors, ServerError};
use crate::forms::parse_id;
use crate::reports::{generate_report, ExportFormat, Report, ReportFilters};

pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[derive(Debug, Serialize)]
pub struct Receipt {
    pub id: i64,
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LookupResult {
    pub id: i64,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ComplaintDetail {
    pub complaint: Complaint,
    pub status_label: &'static str,
    pub assignee: Option<StaffMember>,
    pub history: Vec<StatusUpdate>,
}

#[derive(Debug, Serialize)]
pub struct TechnicianDashboard {
    pub technician: String,
    pub metrics: TechnicianMetrics,
    pub complaints: Vec<Complaint>,
}

#[derive(Debug, Serialize)]
pub struct Triage {
    pub filter: Option<String>,
    pub q: Option<String>,
    pub complaints: Vec<Complaint>,
    pub technicians: Vec<StaffMember>,
}

fn non_blank<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

pub fn submit_complaint(
    app: &App,
    actor: &Actor,
    form: &HashMap<String, String>,
) -> Result<Receipt, ServerError> {
    actor.require(Capability::SubmitComplaint)?;
    let new = NewComplaint::from_form(form)?;
    let complaint = app
        .db
        .with_conn(|conn| insert_complaint(conn, &new, now_unix()))?;

    info!("complaint #{} submitted at {:?}", complaint.id, complaint.location);

    app.notifier.notify_email(
        complaint.email.as_deref(),
        "Complaint Received",
        &format!(
            "Your complaint has been received.\n\nComplaint ID: {}\nCheck status: {}/lookup",
            complaint.id, app.config.public_base_url
        ),
    );
    app.notifier.notify_sms(
        complaint.contact.as_deref(),
        &format!(
            "Complaint #{} received. Use your ID to check status online.",
            complaint.id
        ),
    );

    Ok(Receipt {
        id: complaint.id,
        status: complaint.status.label(),
        message: format!(
            "Complaint submitted. Your complaint ID is {}.",
            complaint.id
        ),
    })
}

pub fn lookup_status(
    app: &App,
    actor: &Actor,
    params: &HashMap<String, String>,
) -> Result<LookupResult, ServerError> {
    actor.require(Capability::LookupStatus)?;

    let mut errors = FieldErrors::new();
    let id = match parse_id("complaint_id", params.get("complaint_id").map(String::as_str)) {
        Ok(id) => Some(id),
        Err(ServerError::Validation(f)) => {
            errors.extend(f);
            None
        }
        Err(e) => return Err(e),
    };
    let contact = non_blank(params, "contact");
    if contact.is_none() {
        errors.insert("contact", "This field is required.".into());
    }
    let (Some(id), Some(contact)) = (id, contact) else {
        return Err(ServerError::Validation(errors));
    };

    let found = app
        .db
        .with_conn(|conn| find_by_id_and_contact(conn, id, contact))?;

    found
        .map(|c| LookupResult {
            id: c.id,
            status: c.status.label(),
        })
        .ok_or_else(|| ServerError::NotFound("No matching complaint found.".into()))
}

fn run_transition(
    app: &App,
    actor: &Actor,
    complaint_id: i64,
    transition: &Transition,
) -> Result<TransitionOutcome, ServerError> {
    app.db
        .with_conn(|conn| apply_transition(conn, complaint_id, transition, actor, now_unix()))
}

pub fn assign_complaint(
    app: &App,
    actor: &Actor,
    form: &HashMap<String, String>,
) -> Result<TransitionOutcome, ServerError> {
    actor.require(Capability::AssignComplaints)?;

    let complaint = parse_id("complaint", form.get("complaint").map(String::as_str));
    let technician = parse_id("technician", form.get("technician").map(String::as_str));
    let (complaint_id, technician_id) = match (complaint, technician) {
        (Ok(c), Ok(t)) => (c, t),
        (c, t) => {
            let mut errors = FieldErrors::new();
            for err in [c.err(), t.err()].into_iter().flatten() {
                match err {
                    ServerError::Validation(f) => errors.extend(f),
                    other => return Err(other),
                }
            }
            return Err(ServerError::Validation(errors));
        }
    };

    let outcome = run_transition(app, actor, complaint_id, &Transition::Assign { technician_id })?;

    if let Some(tech) = &outcome.assignee {
        app.notifier.notify_email(
            outcome.complaint.email.as_deref(),
            "Complaint Assignment",
            &format!(
                "Your complaint #{} has been assigned to {}.",
                outcome.complaint.id, tech.username
            ),
        );
    }
    Ok(outcome)
}

pub fn update_status(
    app: &App,
    actor: &Actor,
    complaint_id: i64,
    form: &HashMap<String, String>,
) -> Result<TransitionOutcome, ServerError> {
    actor.require(Capability::UpdateStatus)?;

    let status = match non_blank(form, "status") {
        None => return Err(ServerError::invalid("status", "This field is required.")),
        Some(raw) => Status::parse(raw).ok_or_else(|| {
            ServerError::invalid(
                "status",
                format!("Select a valid choice. {raw} is not one of the available choices."),
            )
        })?,
    };
    let comment = non_blank(form, "comment").map(str::to_string);

    let outcome = run_transition(app, actor, complaint_id, &Transition::Update { status, comment })?;

    app.notifier.notify_email(
        outcome.complaint.email.as_deref(),
        "Complaint Status Update",
        &format!(
            "Your complaint #{} status is now {}.",
            outcome.complaint.id,
            outcome.complaint.status.label()
        ),
    );
    Ok(outcome)
}

pub fn complaint_detail(
    app: &App,
    actor: &Actor,
    complaint_id: i64,
) -> Result<ComplaintDetail, ServerError> {
    actor.require(Capability::ViewComplaint)?;

    app.db.with_conn(|conn| {
        let complaint = get_complaint(conn, complaint_id)?
            .ok_or_else(|| ServerError::NotFound("Complaint not found.".into()))?;

        if actor.role() == Role::Technician && complaint.assigned_to != actor.staff_id() {
            return Err(ServerError::Forbidden(format!(
                "Complaint #{} is not assigned to you.",
                complaint.id
            )));
        }

        let assignee = match complaint.assigned_to {
            Some(id) => get_staff(conn, id)?,
            None => None,
        };
        let history = list_updates(conn, complaint.id)?;

        Ok(ComplaintDetail {
            status_label: complaint.status.label(),
            complaint,
            assignee,
            history,
        })
    })
}

pub fn technician_dashboard(app: &App, actor: &Actor) -> Result<TechnicianDashboard, ServerError> {
    actor.require(Capability::ViewOwnMetrics)?;
    let Some(tech_id) = actor.staff_id() else {
        return Err(ServerError::Unauthorized("staff sign-in required".into()));
    };

    let (complaints, history) = app.db.with_conn(|conn| {
        let scan = ComplaintScan {
            assigned_to: Some(tech_id),
            ..Default::default()
        };
        let complaints = scan_complaints(conn, &scan)?;
        let ids: Vec<i64> = complaints.iter().map(|c| c.id).collect();
        let history = histories_for(conn, &ids)?;
        Ok((complaints, history))
    })?;

    Ok(TechnicianDashboard {
        technician: actor.username().to_string(),
        metrics: technician_metrics(&complaints, &history),
        complaints,
    })
}

pub fn global_dashboard(app: &App, actor: &Actor) -> Result<GlobalMetrics, ServerError> {
    actor.require(Capability::ViewGlobalMetrics)?;

    let (complaints, history) = app.db.with_conn(|conn| {
        let complaints = scan_complaints(conn, &ComplaintScan::default())?;
        let resolved: Vec<i64> = complaints
            .iter()
            .filter(|c| c.status.is_terminal())
            .map(|c| c.id)
            .collect();
        let history = histories_for(conn, &resolved)?;
        Ok((complaints, history))
    })?;

    Ok(global_metrics(&complaints, &history, app.config.local_offset))
}

/// Free-text triage search: exact id, location or description substring,
/// or a status whose code or label contains the query.
fn matches_query(c: &Complaint, q: &str) -> bool {
    let q = q.to_lowercase();
    if q.parse::<i64>().ok() == Some(c.id) {
        return true;
    }
    c.location.to_lowercase().contains(&q)
        || c.description.to_lowercase().contains(&q)
        || c.status.code().to_lowercase().contains(&q)
        || c.status.label().to_lowercase().contains(&q)
}

pub fn admin_triage(
    app: &App,
    actor: &Actor,
    params: &HashMap<String, String>,
) -> Result<Triage, ServerError> {
    actor.require(Capability::TriageComplaints)?;

    let filter = non_blank(params, "filter").map(str::to_string);
    let q = non_blank(params, "q").map(str::to_string);

    let mut scan = ComplaintScan {
        order: ScanOrder::StatusThenNewest,
        ..Default::default()
    };
    if filter.as_deref() == Some("closed_by_tech") {
        scan.statuses = vec![Status::Fixed, Status::Closed];
        scan.assigned_only = true;
    }

    let (mut complaints, technicians) = app.db.with_conn(|conn| {
        Ok((scan_complaints(conn, &scan)?, list_technicians(conn)?))
    })?;

    if let Some(q) = &q {
        complaints.retain(|c| matches_query(c, q));
    }

    Ok(Triage {
        filter,
        q,
        complaints,
        technicians,
    })
}

pub fn report(
    app: &App,
    actor: &Actor,
    params: &HashMap<String, String>,
) -> Result<Report, ServerError> {
    actor.require(Capability::GenerateReports)?;

    let filters = ReportFilters::from_params(params)?;
    let format = ExportFormat::from_params(params);
    let offset = app.config.local_offset;

    let report = app
        .db
        .with_conn(|conn| generate_report(conn, &filters, format, offset))?;

    if let Some(name) = report.filename() {
        info!("{} exported {name}", actor.username());
    }
    Ok(report)
}
