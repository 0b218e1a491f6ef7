//! Request validation rules.
//!
//! Checks a [`PatientRequest`] before any store access. Every rule is evaluated and all
//! violations are returned together, so a client can fix the whole request in one round trip.
//!
//! | Field            | Rule                                                     |
//! |------------------|----------------------------------------------------------|
//! | `name`           | required, non-blank, at most 100 characters              |
//! | `email`          | required, non-blank, valid email syntax                  |
//! | `address`        | required, non-blank                                      |
//! | `dateOfBirth`    | required, non-blank, ISO-8601 calendar date              |
//! | `registeredDate` | required and non-blank on create only; ignored on update |

use crate::constants::{
    FIELD_ADDRESS, FIELD_DATE_OF_BIRTH, FIELD_EMAIL, FIELD_NAME, FIELD_REGISTERED_DATE,
    MAX_NAME_LEN,
};
use crate::error::{PatientError, PatientResult};
use crate::mapper::parse_iso_date;
use crate::pb::PatientRequest;
use patient_types::{EmailAddress, TextError};
use std::fmt;

/// Which operation a request is being validated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationContext {
    Create,
    Update,
}

/// A single rejected field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    /// Wire name of the field.
    pub field: &'static str,
    pub message: String,
}

/// The non-empty set of violations found in one request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field,
            message: message.into(),
        });
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// True if at least one violation names `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for v in &self.violations {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", v.field, v.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Returns the value if it is present and not blank.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Parses the request email into the typed address used by the uniqueness guard.
///
/// # Errors
///
/// Returns [`PatientError::InvalidInput`] if the email is missing or malformed. Requests that
/// passed [`validate_patient_request`] never hit this.
pub fn request_email(req: &PatientRequest) -> PatientResult<EmailAddress> {
    EmailAddress::parse(req.email.as_deref().unwrap_or_default())
        .map_err(|e| PatientError::InvalidInput(e.to_string()))
}

/// Validates `req` for the given operation.
///
/// # Errors
///
/// Returns every violation found; never stops at the first.
pub fn validate_patient_request(
    req: &PatientRequest,
    context: ValidationContext,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    match present(&req.name) {
        None => errors.push(FIELD_NAME, "Name is required"),
        Some(name) if name.chars().count() > MAX_NAME_LEN => {
            errors.push(FIELD_NAME, "Name cannot exceed 100 characters")
        }
        Some(_) => {}
    }

    match req.email.as_deref().map(EmailAddress::parse) {
        None | Some(Err(TextError::Empty)) => errors.push(FIELD_EMAIL, "Email is required"),
        Some(Err(_)) => errors.push(FIELD_EMAIL, "Email should be valid"),
        Some(Ok(_)) => {}
    }

    if present(&req.address).is_none() {
        errors.push(FIELD_ADDRESS, "Address is required");
    }

    match present(&req.date_of_birth) {
        None => errors.push(FIELD_DATE_OF_BIRTH, "Date of birth is required"),
        Some(dob) if parse_iso_date(dob).is_none() => errors.push(
            FIELD_DATE_OF_BIRTH,
            "Date of birth must be a valid ISO-8601 date (YYYY-MM-DD)",
        ),
        Some(_) => {}
    }

    if context == ValidationContext::Create && present(&req.registered_date).is_none() {
        errors.push(FIELD_REGISTERED_DATE, "Registered date is required");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
