use crate::validation::ValidationErrors;
use patient_uuid::{PatientId, UuidError};

/// Errors raised by a [`PatientRepository`](crate::PatientRepository).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// The store's own uniqueness constraint rejected the email.
    #[error("email already in use: {0}")]
    EmailConflict(String),
    /// An update targeted a record that is no longer stored.
    #[error("patient not found: {0}")]
    NotFound(PatientId),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    #[error("failed to create database directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("patient store lock poisoned")]
    LockPoisoned,
}

pub type RepoResult<T> = std::result::Result<T, RepoError>;

/// Failures of the patient operations.
///
/// Every variant except [`PatientError::Persistence`] is correctable by the client.
#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("email already exists: {0}")]
    EmailAlreadyExists(String),
    #[error("patient not found: {0}")]
    PatientNotFound(PatientId),
    #[error("malformed date in {field}: '{value}' is not an ISO-8601 date")]
    MalformedDate { field: &'static str, value: String },
    #[error("persistence error: {0}")]
    Persistence(#[source] RepoError),
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;

impl From<RepoError> for PatientError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::EmailConflict(email) => Self::EmailAlreadyExists(email),
            RepoError::NotFound(id) => Self::PatientNotFound(id),
            other => Self::Persistence(other),
        }
    }
}

impl From<UuidError> for PatientError {
    fn from(value: UuidError) -> Self {
        match value {
            UuidError::InvalidInput(msg) => Self::InvalidInput(msg),
        }
    }
}

impl PatientError {
    /// True when the failure lies with the store rather than the request.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
