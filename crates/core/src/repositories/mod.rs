//! Persistence contract for patient records and its implementations.
//!
//! The [`PatientRepository`] trait is the only way the service touches storage. Two stores
//! implement it:
//! - [`sqlite::SqlitePatientRepository`]: durable, the default.
//! - [`memory::MemoryPatientRepository`]: process-local, for development and tests.
//!
//! Both enforce email uniqueness at write time and report a duplicate as
//! [`RepoError::EmailConflict`](crate::RepoError::EmailConflict).

use crate::config::{CoreConfig, PatientStore};
use crate::error::RepoResult;
use crate::record::{Patient, PatientDraft};
use patient_uuid::PatientId;
use std::sync::Arc;

pub mod memory;
pub mod sqlite;

/// Storage operations required by [`PatientService`](crate::PatientService).
///
/// Each call is independent; implementations provide no locking across calls.
pub trait PatientRepository: Send + Sync {
    /// Returns every stored patient, ordered by name then id.
    fn find_all(&self) -> RepoResult<Vec<Patient>>;

    fn find_by_id(&self, id: PatientId) -> RepoResult<Option<Patient>>;

    /// True if any stored patient has exactly this email.
    fn exists_by_email(&self, email: &str) -> RepoResult<bool>;

    /// True if a stored patient other than `id` has exactly this email.
    fn exists_by_email_excluding(&self, email: &str, id: PatientId) -> RepoResult<bool>;

    /// Inserts a new patient (assigning its id) or overwrites an existing one.
    ///
    /// Overwriting never changes the stored registered date.
    ///
    /// # Errors
    ///
    /// - [`RepoError::EmailConflict`](crate::RepoError::EmailConflict) if another record holds
    ///   the email.
    /// - [`RepoError::NotFound`](crate::RepoError::NotFound) if an existing record was removed
    ///   before the write.
    fn save(&self, draft: PatientDraft) -> RepoResult<Patient>;

    /// Removes the patient if present. Returns whether a record was removed; removing an absent
    /// id is not an error.
    fn delete_by_id(&self, id: PatientId) -> RepoResult<bool>;
}

/// Opens the store selected by `cfg`.
pub fn open_repository(cfg: &CoreConfig) -> RepoResult<Arc<dyn PatientRepository>> {
    match cfg.store() {
        PatientStore::Memory => {
            tracing::warn!("using in-memory patient store; records will not survive a restart");
            Ok(Arc::new(memory::MemoryPatientRepository::new()))
        }
        PatientStore::Sqlite(path) => {
            tracing::info!("opening patient database at {}", path.display());
            Ok(Arc::new(sqlite::SqlitePatientRepository::open(path)?))
        }
    }
}
