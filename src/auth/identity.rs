// src/auth/identity.rs
//! Caller classification. Who someone is comes from the outside (a bearer
//! token issued with `add-staff`); what they may do is decided here.

use astra::Request;
use serde::Serialize;

use crate::auth::token::hash_token;
use crate::db::connection::Database;
use crate::db::staff::{self, StaffMember};
use crate::errors::ServerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Technician,
    Manager,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Technician => "technician",
            Role::Manager => "manager",
        }
    }

    /// Staff roles only; citizens are never stored.
    pub fn parse_staff(input: &str) -> Option<Role> {
        match input.trim().to_ascii_lowercase().as_str() {
            "technician" => Some(Role::Technician),
            "manager" => Some(Role::Manager),
            _ => None,
        }
    }

    pub fn allows(self, cap: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Citizen => matches!(cap, SubmitComplaint | LookupStatus),
            Role::Technician => matches!(
                cap,
                SubmitComplaint | LookupStatus | ViewComplaint | UpdateStatus | ViewOwnMetrics
            ),
            Role::Manager => !matches!(cap, ViewOwnMetrics),
        }
    }
}

/// Everything the HTTP surface gates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    SubmitComplaint,
    LookupStatus,
    ViewComplaint,
    UpdateStatus,
    AssignComplaints,
    TriageComplaints,
    ViewOwnMetrics,
    ViewGlobalMetrics,
    GenerateReports,
}

#[derive(Debug, Clone)]
pub enum Actor {
    Citizen,
    Staff(StaffMember),
}

impl Actor {
    pub fn role(&self) -> Role {
        match self {
            Actor::Citizen => Role::Citizen,
            Actor::Staff(member) => member.role,
        }
    }

    pub fn staff_id(&self) -> Option<i64> {
        match self {
            Actor::Citizen => None,
            Actor::Staff(member) => Some(member.id),
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Actor::Citizen => "anonymous",
            Actor::Staff(member) => &member.username,
        }
    }

    /// Anonymous callers get 401, signed-in staff lacking the capability get 403.
    pub fn require(&self, cap: Capability) -> Result<(), ServerError> {
        if self.role().allows(cap) {
            return Ok(());
        }
        match self {
            Actor::Citizen => Err(ServerError::Unauthorized("staff sign-in required".into())),
            Actor::Staff(member) => Err(ServerError::Forbidden(format!(
                "{} role may not perform this action",
                member.role.as_str()
            ))),
        }
    }
}

pub trait IdentityProvider: Send + Sync {
    fn identify(&self, req: &Request, db: &Database) -> Result<Actor, ServerError>;
}

/// `Authorization: Bearer <token>` checked against `staff.token_hash`.
/// No header means an anonymous citizen.
pub struct BearerTokenIdentity;

impl IdentityProvider for BearerTokenIdentity {
    fn identify(&self, req: &Request, db: &Database) -> Result<Actor, ServerError> {
        let Some(header) = req.headers().get("Authorization") else {
            return Ok(Actor::Citizen);
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServerError::Unauthorized("malformed Authorization header".into()))?;

        let hash = hash_token(token);
        let member = db.with_conn(|conn| staff::find_by_token_hash(conn, &hash))?;

        member
            .map(Actor::Staff)
            .ok_or_else(|| ServerError::Unauthorized("invalid or revoked token".into()))
    }
}
