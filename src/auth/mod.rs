pub mod identity;
pub mod token;

pub use identity::{Actor, BearerTokenIdentity, Capability, IdentityProvider, Role};

use crate::auth::token::{hash_token, new_staff_token};
use crate::db::connection::Database;
use crate::db::staff::{self, StaffMember};
use crate::errors::ServerError;

/// Create a staff member and return the raw bearer token.
/// The token is shown once; only its hash is stored.
pub fn register_staff(
    db: &Database,
    username: &str,
    role: Role,
    email: Option<&str>,
    now: i64,
) -> Result<(StaffMember, String), ServerError> {
    let username = username.trim();
    if username.is_empty() || username.chars().any(char::is_whitespace) {
        return Err(ServerError::invalid(
            "username",
            "Enter a username without spaces.",
        ));
    }
    if role == Role::Citizen {
        return Err(ServerError::invalid("role", "Staff role must be technician or manager."));
    }

    let token = new_staff_token();
    let hash = hash_token(&token);
    let member = db.with_conn(|conn| staff::insert_staff(conn, username, role, email, &hash, now))?;
    Ok((member, token))
}
