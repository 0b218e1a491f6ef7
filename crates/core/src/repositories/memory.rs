//! Process-local patient store.

use super::PatientRepository;
use crate::error::{RepoError, RepoResult};
use crate::record::{Patient, PatientDraft};
use patient_uuid::PatientId;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Patient store backed by a map behind a read-write lock.
///
/// The email check in [`save`](PatientRepository::save) runs under the write lock, so two
/// concurrent saves of the same email cannot both succeed.
#[derive(Debug, Default)]
pub struct MemoryPatientRepository {
    patients: RwLock<BTreeMap<PatientId, Patient>>,
}

impl MemoryPatientRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PatientRepository for MemoryPatientRepository {
    fn find_all(&self) -> RepoResult<Vec<Patient>> {
        let patients = self.patients.read().map_err(|_| RepoError::LockPoisoned)?;
        let mut all: Vec<Patient> = patients.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    fn find_by_id(&self, id: PatientId) -> RepoResult<Option<Patient>> {
        let patients = self.patients.read().map_err(|_| RepoError::LockPoisoned)?;
        Ok(patients.get(&id).cloned())
    }

    fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        let patients = self.patients.read().map_err(|_| RepoError::LockPoisoned)?;
        Ok(patients.values().any(|p| p.email == email))
    }

    fn exists_by_email_excluding(&self, email: &str, id: PatientId) -> RepoResult<bool> {
        let patients = self.patients.read().map_err(|_| RepoError::LockPoisoned)?;
        Ok(patients.values().any(|p| p.email == email && p.id != id))
    }

    fn save(&self, draft: PatientDraft) -> RepoResult<Patient> {
        let mut patients = self.patients.write().map_err(|_| RepoError::LockPoisoned)?;

        let own_id = match &draft {
            PatientDraft::New(_) => None,
            PatientDraft::Existing(p) => Some(p.id),
        };
        if patients
            .values()
            .any(|p| p.email == draft.email() && Some(p.id) != own_id)
        {
            return Err(RepoError::EmailConflict(draft.email().to_owned()));
        }

        let saved = match draft {
            PatientDraft::New(new) => {
                let mut id = PatientId::new();
                while patients.contains_key(&id) {
                    id = PatientId::new();
                }
                new.into_patient(id)
            }
            PatientDraft::Existing(mut patient) => {
                let stored = patients
                    .get(&patient.id)
                    .ok_or(RepoError::NotFound(patient.id))?;
                patient.registered_date = stored.registered_date;
                patient
            }
        };

        patients.insert(saved.id, saved.clone());
        Ok(saved)
    }

    fn delete_by_id(&self, id: PatientId) -> RepoResult<bool> {
        let mut patients = self.patients.write().map_err(|_| RepoError::LockPoisoned)?;
        Ok(patients.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewPatient;
    use chrono::NaiveDate;

    fn new_patient(name: &str, email: &str) -> NewPatient {
        let date = NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid date");
        NewPatient {
            name: name.into(),
            email: email.into(),
            address: "1 Rd".into(),
            date_of_birth: date,
            registered_date: date,
        }
    }

    #[test]
    fn insert_assigns_id_and_is_retrievable() {
        let repo = MemoryPatientRepository::new();
        let saved = repo
            .save(new_patient("Ann", "a@x.com").into())
            .expect("insert");

        let found = repo.find_by_id(saved.id).expect("lookup");
        assert_eq!(found, Some(saved));
    }

    #[test]
    fn find_all_orders_by_name() {
        let repo = MemoryPatientRepository::new();
        repo.save(new_patient("Cat", "c@x.com").into()).expect("insert");
        repo.save(new_patient("Ann", "a@x.com").into()).expect("insert");
        repo.save(new_patient("Bea", "b@x.com").into()).expect("insert");

        let names: Vec<_> = repo
            .find_all()
            .expect("list")
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Ann", "Bea", "Cat"]);
    }

    #[test]
    fn save_rejects_duplicate_email() {
        let repo = MemoryPatientRepository::new();
        repo.save(new_patient("Ann", "a@x.com").into()).expect("insert");

        let err = repo
            .save(new_patient("Other", "a@x.com").into())
            .expect_err("duplicate email");
        assert!(matches!(err, RepoError::EmailConflict(_)));
        assert_eq!(repo.find_all().expect("list").len(), 1);
    }

    #[test]
    fn overwrite_keeps_registered_date() {
        let repo = MemoryPatientRepository::new();
        let saved = repo.save(new_patient("Ann", "a@x.com").into()).expect("insert");

        let mut changed = saved.clone();
        changed.name = "Ann Smith".into();
        changed.registered_date = NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid date");

        let updated = repo.save(changed.into()).expect("overwrite");
        assert_eq!(updated.name, "Ann Smith");
        assert_eq!(updated.registered_date, saved.registered_date);
    }

    #[test]
    fn overwrite_of_removed_record_is_not_found() {
        let repo = MemoryPatientRepository::new();
        let saved = repo.save(new_patient("Ann", "a@x.com").into()).expect("insert");
        assert!(repo.delete_by_id(saved.id).expect("delete"));

        let err = repo.save(saved.into()).expect_err("record is gone");
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[test]
    fn delete_is_idempotent() {
        let repo = MemoryPatientRepository::new();
        let saved = repo.save(new_patient("Ann", "a@x.com").into()).expect("insert");

        assert!(repo.delete_by_id(saved.id).expect("first delete"));
        assert!(!repo.delete_by_id(saved.id).expect("second delete"));
        assert!(!repo.delete_by_id(PatientId::new()).expect("unknown id"));
    }
}
