// src/domain/transition.rs
//! The only code path that changes a complaint's status or assignee.
//!
//! Every transition re-reads the row, checks the terminal state, appends the
//! history entry and mirrors status/assignee inside one IMMEDIATE
//! transaction, so two workers racing on the same complaint serialize and
//! the loser sees the terminal state.

use log::info;
use rusqlite::{Connection, TransactionBehavior};

use crate::auth::{Actor, Role};
use crate::db::complaints::{get_complaint, set_status_and_assignee};
use crate::db::staff::{get_technician, StaffMember};
use crate::db::status_updates::append_update;
use crate::domain::complaint::{Complaint, StatusUpdate};
use crate::domain::status::Status;
use crate::errors::ServerError;

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Hand the complaint to a technician; always moves it to In Progress.
    Assign { technician_id: i64 },
    /// Manual status change with an optional comment.
    Update {
        status: Status,
        comment: Option<String>,
    },
}

impl Transition {
    fn rejected_action(&self) -> &'static str {
        match self {
            Transition::Assign { .. } => "cannot reassign",
            Transition::Update { .. } => "cannot be updated",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub complaint: Complaint,
    pub update: StatusUpdate,
    pub assignee: Option<StaffMember>,
}

pub fn apply_transition(
    conn: &mut Connection,
    complaint_id: i64,
    transition: &Transition,
    actor: &Actor,
    now: i64,
) -> Result<TransitionOutcome, ServerError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    let Some(mut complaint) = get_complaint(&tx, complaint_id)? else {
        return Err(ServerError::NotFound("Complaint not found.".into()));
    };

    if complaint.status.is_terminal() {
        return Err(ServerError::TerminalState {
            id: complaint.id,
            status: complaint.status,
            action: transition.rejected_action(),
        });
    }

    let (status, comment, assignee) = match transition {
        Transition::Assign { technician_id } => {
            let tech = get_technician(&tx, *technician_id)?
                .ok_or_else(|| ServerError::NotFound("Technician not found.".into()))?;
            let comment = format!("Assigned to {}", tech.username);
            (Status::InProgress, comment, Some(tech))
        }
        Transition::Update { status, comment } => {
            if actor.role() == Role::Technician && complaint.assigned_to != actor.staff_id() {
                return Err(ServerError::Forbidden(format!(
                    "Complaint #{} is not assigned to you.",
                    complaint.id
                )));
            }
            (*status, comment.clone().unwrap_or_default(), None)
        }
    };

    let assigned_to = assignee.as_ref().map(|t| t.id).or(complaint.assigned_to);

    let update = append_update(&tx, complaint.id, status, &comment, now)?;
    let mirrored = set_status_and_assignee(&tx, complaint.id, status, assigned_to)?;
    if mirrored != 1 {
        tx.rollback().ok();
        return Err(ServerError::DbError(format!(
            "complaint #{} changed during transition",
            complaint.id
        )));
    }

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit tx failed: {e}")))?;

    complaint.status = status;
    complaint.assigned_to = assigned_to;

    info!(
        "complaint #{} -> {} by {} ({})",
        complaint.id,
        status.code(),
        actor.username(),
        update.comment
    );

    Ok(TransitionOutcome {
        complaint,
        update,
        assignee,
    })
}
