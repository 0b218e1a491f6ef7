//! # Patient Core
//!
//! Core business logic for the patient service.
//!
//! This crate owns the patient write path:
//! - Field validation of incoming requests ([`validation`])
//! - Mapping between wire payloads and stored records ([`mapper`])
//! - The one-email-per-patient guard ([`uniqueness`])
//! - Orchestration of list/get/create/update/delete ([`PatientService`])
//! - The persistence contract and its SQLite and in-memory stores ([`repositories`])
//!
//! **No API concerns**: HTTP routing, status codes and JSON framing belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod error;
pub mod mapper;
pub mod patient;
pub mod record;
pub mod repositories;
pub mod uniqueness;
pub mod validation;

// Use the shared api-shared crate for wire types.
pub use api_shared::pb;

pub use config::{store_from_env_value, CoreConfig, PatientStore};
pub use constants::DEFAULT_PATIENT_DB_PATH;
pub use error::{PatientError, PatientResult, RepoError, RepoResult};
pub use patient::PatientService;
pub use patient_uuid::PatientId;
pub use record::{NewPatient, Patient, PatientDraft};
pub use repositories::{
    memory::MemoryPatientRepository, sqlite::SqlitePatientRepository, PatientRepository,
};
pub use validation::{FieldViolation, ValidationContext, ValidationErrors};
