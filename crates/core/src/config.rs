//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Environment variables are read by the binaries only; the parsing
//! helpers here take the raw value so they can be tested without touching the process
//! environment.

use crate::constants::{DEFAULT_PATIENT_DB_PATH, MEMORY_STORE};
use crate::error::{PatientError, PatientResult};
use std::path::PathBuf;

/// Where patient records are kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatientStore {
    /// Process-local map; contents are lost on exit.
    Memory,
    /// SQLite database file.
    Sqlite(PathBuf),
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    store: PatientStore,
}

impl CoreConfig {
    pub fn new(store: PatientStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &PatientStore {
        &self.store
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(PatientStore::Sqlite(PathBuf::from(DEFAULT_PATIENT_DB_PATH)))
    }
}

/// Parse the store selection from an optional `PATIENT_STORE` value.
///
/// - `None` or blank: SQLite at [`DEFAULT_PATIENT_DB_PATH`].
/// - `memory` (any case): the in-memory store.
/// - anything else: a SQLite database path.
///
/// # Errors
///
/// Returns [`PatientError::InvalidInput`] if the value names an existing directory.
pub fn store_from_env_value(value: Option<String>) -> PatientResult<PatientStore> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(PatientStore::Sqlite(PathBuf::from(DEFAULT_PATIENT_DB_PATH)));
    };

    if value.eq_ignore_ascii_case(MEMORY_STORE) {
        return Ok(PatientStore::Memory);
    }

    let path = PathBuf::from(value);
    if path.is_dir() {
        return Err(PatientError::InvalidInput(format!(
            "PATIENT_STORE must be a database file path, not a directory: {}",
            path.display()
        )));
    }

    Ok(PatientStore::Sqlite(path))
}
