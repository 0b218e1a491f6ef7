//! Translation between wire payloads and stored records.
//!
//! - [`to_wire`]: stored [`Patient`] → [`PatientResponse`]. Total; the registered date is never
//!   exposed.
//! - [`from_wire`]: [`PatientRequest`] → [`NewPatient`]. Strings are copied verbatim; both dates
//!   must be ISO-8601 calendar dates.
//! - [`apply_update`]: overwrites the mutable fields of a stored record from a request.

use crate::constants::{FIELD_DATE_OF_BIRTH, FIELD_REGISTERED_DATE, ISO_DATE_FORMAT};
use crate::error::{PatientError, PatientResult};
use crate::pb::{PatientRequest, PatientResponse};
use crate::record::{NewPatient, Patient};
use chrono::NaiveDate;

/// Parses an ISO-8601 calendar date in its extended form (`YYYY-MM-DD`).
///
/// The year is exactly four digits and day and month are zero-padded, so `1990-1-1` and
/// signed years such as `-999-01-01` are rejected.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 {
        return None;
    }

    let well_formed = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !well_formed {
        return None;
    }

    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT).ok()
}

fn parse_date_field(field: &'static str, value: Option<&str>) -> PatientResult<NaiveDate> {
    let raw = value.unwrap_or_default();
    parse_iso_date(raw).ok_or_else(|| PatientError::MalformedDate {
        field,
        value: raw.to_owned(),
    })
}

pub fn to_wire(patient: &Patient) -> PatientResponse {
    PatientResponse {
        id: patient.id.to_string(),
        name: patient.name.clone(),
        email: patient.email.clone(),
        address: patient.address.clone(),
        date_of_birth: patient.date_of_birth.format(ISO_DATE_FORMAT).to_string(),
    }
}

/// Builds a draft record from a create request.
///
/// # Errors
///
/// Returns [`PatientError::MalformedDate`] if either date is missing or not ISO-8601.
pub fn from_wire(req: &PatientRequest) -> PatientResult<NewPatient> {
    Ok(NewPatient {
        name: req.name.clone().unwrap_or_default(),
        email: req.email.clone().unwrap_or_default(),
        address: req.address.clone().unwrap_or_default(),
        date_of_birth: parse_date_field(FIELD_DATE_OF_BIRTH, req.date_of_birth.as_deref())?,
        registered_date: parse_date_field(
            FIELD_REGISTERED_DATE,
            req.registered_date.as_deref(),
        )?,
    })
}

/// Replaces name, email, address and date of birth wholesale. The registered date and id are
/// carried over unchanged; any `registeredDate` in the request is ignored.
///
/// # Errors
///
/// Returns [`PatientError::MalformedDate`] if the date of birth is missing or not ISO-8601.
pub fn apply_update(existing: Patient, req: &PatientRequest) -> PatientResult<Patient> {
    Ok(Patient {
        date_of_birth: parse_date_field(FIELD_DATE_OF_BIRTH, req.date_of_birth.as_deref())?,
        name: req.name.clone().unwrap_or_default(),
        email: req.email.clone().unwrap_or_default(),
        address: req.address.clone().unwrap_or_default(),
        ..existing
    })
}
