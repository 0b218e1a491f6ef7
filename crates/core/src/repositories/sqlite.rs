//! SQLite-backed patient store.
//!
//! ## Schema
//! One `patients` table (see `migrations/`). Dates are stored as ISO-8601 text and ids in their
//! hyphenated text form. `email` carries a `UNIQUE` constraint, which is the authoritative
//! guard against two concurrent creates with the same email.
//!
//! ## Migrations
//! The applied schema version is kept in `PRAGMA user_version`. Opening a database written by a
//! newer binary fails with [`RepoError::UnsupportedSchemaVersion`].
//!
//! ## Concurrency
//! A single connection is shared behind a mutex; each trait call holds the lock for its whole
//! duration.

use super::PatientRepository;
use crate::error::{RepoError, RepoResult};
use crate::record::{Patient, PatientDraft};
use patient_uuid::PatientId;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("migrations/0001_patients.sql"),
}];

const PATIENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    address,
    date_of_birth,
    registered_date
FROM patients";

/// Returns the latest schema version known by this binary.
pub fn latest_schema_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

fn apply_migrations(conn: &mut Connection) -> RepoResult<()> {
    let current: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_schema_version();

    if current > latest {
        return Err(RepoError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }

    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        tracing::info!("applied patient schema migration {}", migration.version);
    }
    tx.commit()?;

    Ok(())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn map_write_error(err: rusqlite::Error, email: &str) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::EmailConflict(email.to_owned())
    } else {
        RepoError::Sqlite(err)
    }
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    let id_text: String = row.get("id")?;
    let id = PatientId::parse(&id_text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

    Ok(Patient {
        id,
        name: row.get("name")?,
        email: row.get("email")?,
        address: row.get("address")?,
        date_of_birth: row.get("date_of_birth")?,
        registered_date: row.get("registered_date")?,
    })
}

fn select_by_id(conn: &Connection, id: PatientId) -> RepoResult<Option<Patient>> {
    let patient = conn
        .query_row(
            &format!("{PATIENT_SELECT_SQL} WHERE id = ?1"),
            [id.to_string()],
            patient_from_row,
        )
        .optional()?;
    Ok(patient)
}

/// Patient store on a single SQLite connection.
#[derive(Debug)]
pub struct SqlitePatientRepository {
    conn: Mutex<Connection>,
}

impl SqlitePatientRepository {
    /// Opens (creating if needed) the database file at `path` and applies pending migrations.
    ///
    /// The parent directory is created if it does not exist.
    pub fn open(path: &Path) -> RepoResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(RepoError::StorageDirCreation)?;
        }
        Self::bootstrap(Connection::open(path)?)
    }

    /// Opens a private in-memory database with the schema applied.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(mut conn: Connection) -> RepoResult<Self> {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::LockPoisoned)
    }
}

impl PatientRepository for SqlitePatientRepository {
    fn find_all(&self) -> RepoResult<Vec<Patient>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{PATIENT_SELECT_SQL} ORDER BY name ASC, id ASC"))?;
        let patients = stmt
            .query_map([], patient_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(patients)
    }

    fn find_by_id(&self, id: PatientId) -> RepoResult<Option<Patient>> {
        let conn = self.conn()?;
        select_by_id(&conn, id)
    }

    fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        let conn = self.conn()?;
        let exists = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM patients WHERE email = ?1)",
            [email],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn exists_by_email_excluding(&self, email: &str, id: PatientId) -> RepoResult<bool> {
        let conn = self.conn()?;
        let exists = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM patients WHERE email = ?1 AND id <> ?2)",
            params![email, id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn save(&self, draft: PatientDraft) -> RepoResult<Patient> {
        let conn = self.conn()?;

        match draft {
            PatientDraft::New(new) => {
                let id = PatientId::new();
                conn.execute(
                    "INSERT INTO patients (
                        id,
                        name,
                        email,
                        address,
                        date_of_birth,
                        registered_date
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        id.to_string(),
                        new.name,
                        new.email,
                        new.address,
                        new.date_of_birth,
                        new.registered_date,
                    ],
                )
                .map_err(|e| map_write_error(e, &new.email))?;

                Ok(new.into_patient(id))
            }
            PatientDraft::Existing(patient) => {
                let changed = conn
                    .execute(
                        "UPDATE patients
                         SET
                            name = ?2,
                            email = ?3,
                            address = ?4,
                            date_of_birth = ?5
                         WHERE id = ?1",
                        params![
                            patient.id.to_string(),
                            patient.name,
                            patient.email,
                            patient.address,
                            patient.date_of_birth,
                        ],
                    )
                    .map_err(|e| map_write_error(e, &patient.email))?;

                if changed == 0 {
                    return Err(RepoError::NotFound(patient.id));
                }

                select_by_id(&conn, patient.id)?.ok_or(RepoError::NotFound(patient.id))
            }
        }
    }

    fn delete_by_id(&self, id: PatientId) -> RepoResult<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM patients WHERE id = ?1", [id.to_string()])?;
        Ok(removed > 0)
    }
}
