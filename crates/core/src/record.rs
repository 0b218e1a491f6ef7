//! Persisted patient representation.

use chrono::NaiveDate;
use patient_uuid::PatientId;

/// A stored patient record.
///
/// `id` is assigned by the store on first save. `registered_date` is fixed at creation; saving
/// an existing record never rewrites it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub registered_date: NaiveDate,
}

/// A patient that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub registered_date: NaiveDate,
}

impl NewPatient {
    /// Attaches a store-assigned identifier.
    pub fn into_patient(self, id: PatientId) -> Patient {
        Patient {
            id,
            name: self.name,
            email: self.email,
            address: self.address,
            date_of_birth: self.date_of_birth,
            registered_date: self.registered_date,
        }
    }
}

/// Input to [`PatientRepository::save`](crate::PatientRepository::save): insert a new record
/// or overwrite an existing one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatientDraft {
    New(NewPatient),
    Existing(Patient),
}

impl PatientDraft {
    pub fn email(&self) -> &str {
        match self {
            Self::New(p) => &p.email,
            Self::Existing(p) => &p.email,
        }
    }
}

impl From<NewPatient> for PatientDraft {
    fn from(value: NewPatient) -> Self {
        Self::New(value)
    }
}

impl From<Patient> for PatientDraft {
    fn from(value: Patient) -> Self {
        Self::Existing(value)
    }
}
