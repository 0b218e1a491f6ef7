//! One email per patient.
//!
//! These checks run before a write so the caller gets a precise
//! [`PatientError::EmailAlreadyExists`]. They are not atomic with the write that follows; the
//! stores also reject a duplicate email at write time and the service maps that rejection to the
//! same error.

use crate::error::{PatientError, PatientResult};
use crate::repositories::PatientRepository;
use patient_types::EmailAddress;
use patient_uuid::PatientId;

/// Fails if any stored patient already uses `email`.
pub fn check_create_uniqueness(
    repo: &dyn PatientRepository,
    email: &EmailAddress,
) -> PatientResult<()> {
    if repo.exists_by_email(email.as_str())? {
        return Err(PatientError::EmailAlreadyExists(email.as_str().to_owned()));
    }
    Ok(())
}

/// Fails if a patient other than `exclude_id` already uses `email`.
///
/// The patient being updated may keep its own email.
pub fn check_update_uniqueness(
    repo: &dyn PatientRepository,
    email: &EmailAddress,
    exclude_id: PatientId,
) -> PatientResult<()> {
    if repo.exists_by_email_excluding(email.as_str(), exclude_id)? {
        return Err(PatientError::EmailAlreadyExists(email.as_str().to_owned()));
    }
    Ok(())
}
