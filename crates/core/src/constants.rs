//! Constants used throughout the patient core crate.

/// Default SQLite database location when no store is configured.
pub const DEFAULT_PATIENT_DB_PATH: &str = "patient_data/patients.db";

/// `PATIENT_STORE` value selecting the non-durable in-memory store.
pub const MEMORY_STORE: &str = "memory";

/// Maximum length of a patient name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Wire field names, used when reporting field-level violations.
pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_ADDRESS: &str = "address";
pub const FIELD_DATE_OF_BIRTH: &str = "dateOfBirth";
pub const FIELD_REGISTERED_DATE: &str = "registeredDate";

/// Wire format of calendar dates (ISO-8601 extended, `YYYY-MM-DD`).
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
