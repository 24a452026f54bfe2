// src/domain/complaint.rs

use serde::Serialize;
use std::collections::HashMap;

use crate::domain::status::Status;
use crate::errors::{FieldErrors, ServerError};

pub const NAME_MAX: usize = 120;
pub const CONTACT_MAX: usize = 64;
pub const EMAIL_MAX: usize = 254;
pub const LOCATION_MAX: usize = 255;
pub const PHOTO_MAX: usize = 255;

const REQUIRED: &str = "This field is required.";

/// A citizen-submitted service issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Complaint {
    pub id: i64,
    pub name: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub location: String,
    pub description: String,
    /// Reference to an externally stored photo.
    pub photo: Option<String>,
    pub created_at: i64,
    pub status: Status,
    pub assigned_to: Option<i64>,
}

/// One entry of a complaint's append-only history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub id: i64,
    pub complaint_id: i64,
    pub status: Status,
    pub comment: String,
    pub timestamp: i64,
}

/// Validated submission input.
#[derive(Debug, Clone, Default)]
pub struct NewComplaint {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub location: String,
    pub description: String,
    pub photo: Option<String>,
}

impl NewComplaint {
    /// Validate form fields. Every failing field is reported at once.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, ServerError> {
        let mut errors = FieldErrors::new();

        let name = optional(form, "name", NAME_MAX, &mut errors);
        let contact = optional(form, "contact", CONTACT_MAX, &mut errors);
        let email = optional(form, "email", EMAIL_MAX, &mut errors);
        let photo = optional(form, "photo", PHOTO_MAX, &mut errors);
        let location = required(form, "location", Some(LOCATION_MAX), &mut errors);
        let description = required(form, "description", None, &mut errors);

        if let Some(e) = &email {
            if !looks_like_email(e) {
                errors.insert("email", "Enter a valid email address.".into());
            }
        }

        if !errors.is_empty() {
            return Err(ServerError::Validation(errors));
        }

        Ok(NewComplaint {
            name,
            contact,
            email,
            location: location.unwrap_or_default(),
            description: description.unwrap_or_default(),
            photo,
        })
    }
}

fn trimmed<'a>(form: &'a HashMap<String, String>, field: &str) -> Option<&'a str> {
    form.get(field).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn too_long(max: usize, len: usize) -> String {
    format!("Ensure this value has at most {max} characters (it has {len}).")
}

fn optional(
    form: &HashMap<String, String>,
    field: &'static str,
    max: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = trimmed(form, field)?;
    let len = value.chars().count();
    if len > max {
        errors.insert(field, too_long(max, len));
    }
    Some(value.to_string())
}

fn required(
    form: &HashMap<String, String>,
    field: &'static str,
    max: Option<usize>,
    errors: &mut FieldErrors,
) -> Option<String> {
    let Some(value) = trimmed(form, field) else {
        errors.insert(field, REQUIRED.into());
        return None;
    };
    if let Some(max) = max {
        let len = value.chars().count();
        if len > max {
            errors.insert(field, too_long(max, len));
        }
    }
    Some(value.to_string())
}

/// Same minimal sanity check the sign-in flow used: one '@', something on both sides.
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}
