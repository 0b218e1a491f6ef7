//! Patient service.
//!
//! Each operation is a fixed pipeline of guarded steps; the first step that fails ends the
//! operation and its error is returned unchanged.
//!
//! | Operation | Steps                                                                        |
//! |-----------|------------------------------------------------------------------------------|
//! | list      | fetch all → map                                                              |
//! | get       | find by id (absent → not found) → map                                        |
//! | create    | validate (create) → email unused → build record → save → map                 |
//! | update    | find by id (absent → not found) → validate (update) → email unused by others |
//! |           | → replace name/email/address/date of birth → save → map                      |
//! | delete    | delete by id (absent is fine)                                                |

use crate::config::CoreConfig;
use crate::error::{PatientError, PatientResult};
use crate::mapper::{apply_update, from_wire, to_wire};
use crate::pb::{PatientRequest, PatientResponse};
use crate::repositories::{open_repository, PatientRepository};
use crate::uniqueness::{check_create_uniqueness, check_update_uniqueness};
use crate::validation::{request_email, validate_patient_request, ValidationContext};
use patient_uuid::PatientId;
use std::sync::Arc;

/// Pure patient data operations - no API concerns
///
/// Holds only a handle to the store; nothing is cached between calls. Cloning is cheap and
/// clones share the store.
#[derive(Clone)]
pub struct PatientService {
    repo: Arc<dyn PatientRepository>,
}

impl PatientService {
    /// Creates a new instance of PatientService over the given store.
    pub fn new(repo: Arc<dyn PatientRepository>) -> Self {
        Self { repo }
    }

    /// Opens the store selected by `cfg` and wraps it in a service.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::Persistence`] if the store cannot be opened or migrated.
    pub fn from_config(cfg: &CoreConfig) -> PatientResult<Self> {
        let repo = open_repository(cfg).map_err(PatientError::Persistence)?;
        Ok(Self::new(repo))
    }

    /// Lists all patients, ordered by name. An empty store yields an empty list.
    pub fn list_patients(&self) -> PatientResult<Vec<PatientResponse>> {
        let patients = self.repo.find_all()?;
        tracing::debug!("listing {} patients", patients.len());
        Ok(patients.iter().map(to_wire).collect())
    }

    /// Fetches one patient.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::PatientNotFound`] if no patient has `id`.
    pub fn get_patient(&self, id: PatientId) -> PatientResult<PatientResponse> {
        let patient = self
            .repo
            .find_by_id(id)?
            .ok_or(PatientError::PatientNotFound(id))?;
        Ok(to_wire(&patient))
    }

    /// Creates a patient from a create request.
    ///
    /// # Errors
    ///
    /// - [`PatientError::Validation`] listing every invalid field.
    /// - [`PatientError::EmailAlreadyExists`] if the email is taken, whether detected by the
    ///   pre-check or by the store at write time.
    /// - [`PatientError::MalformedDate`] if the registered date is not ISO-8601.
    /// - [`PatientError::Persistence`] if the store fails.
    pub fn create_patient(&self, req: &PatientRequest) -> PatientResult<PatientResponse> {
        validate_patient_request(req, ValidationContext::Create).map_err(|errors| {
            tracing::warn!("create patient rejected: {}", errors);
            PatientError::Validation(errors)
        })?;

        let email = request_email(req)?;
        check_create_uniqueness(self.repo.as_ref(), &email).inspect_err(|_| {
            tracing::warn!("create patient rejected: email already in use");
        })?;

        let draft = from_wire(req)?;
        let patient = self.repo.save(draft.into()).inspect_err(|e| {
            tracing::error!("create patient failed: {}", e);
        })?;

        tracing::info!("created patient {}", patient.id);
        Ok(to_wire(&patient))
    }

    /// Replaces name, email, address and date of birth of an existing patient.
    ///
    /// The registered date is never changed, and a `registeredDate` in the request is ignored.
    /// Keeping the patient's own current email is allowed.
    ///
    /// # Errors
    ///
    /// - [`PatientError::PatientNotFound`] if no patient has `id`.
    /// - [`PatientError::Validation`] listing every invalid field.
    /// - [`PatientError::EmailAlreadyExists`] if another patient uses the email.
    /// - [`PatientError::Persistence`] if the store fails.
    pub fn update_patient(
        &self,
        id: PatientId,
        req: &PatientRequest,
    ) -> PatientResult<PatientResponse> {
        let existing = self
            .repo
            .find_by_id(id)?
            .ok_or(PatientError::PatientNotFound(id))?;

        validate_patient_request(req, ValidationContext::Update).map_err(|errors| {
            tracing::warn!("update of patient {} rejected: {}", id, errors);
            PatientError::Validation(errors)
        })?;

        let email = request_email(req)?;
        check_update_uniqueness(self.repo.as_ref(), &email, id).inspect_err(|_| {
            tracing::warn!("update of patient {} rejected: email already in use", id);
        })?;

        let updated = apply_update(existing, req)?;
        let patient = self.repo.save(updated.into()).inspect_err(|e| {
            tracing::error!("update of patient {} failed: {}", id, e);
        })?;

        tracing::info!("updated patient {}", patient.id);
        Ok(to_wire(&patient))
    }

    /// Deletes a patient. Deleting an id that is not stored succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::Persistence`] if the store fails.
    pub fn delete_patient(&self, id: PatientId) -> PatientResult<()> {
        if self.repo.delete_by_id(id)? {
            tracing::info!("deleted patient {}", id);
        } else {
            tracing::debug!("delete of patient {}: already absent", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FIELD_EMAIL, FIELD_NAME, FIELD_REGISTERED_DATE};
    use crate::error::{RepoError, RepoResult};
    use crate::record::{Patient, PatientDraft};
    use crate::repositories::memory::MemoryPatientRepository;
    use crate::repositories::sqlite::SqlitePatientRepository;

    fn request(name: &str, email: &str) -> PatientRequest {
        PatientRequest {
            name: Some(name.into()),
            email: Some(email.into()),
            address: Some("1 Rd".into()),
            date_of_birth: Some("1990-01-01".into()),
            registered_date: Some("2024-01-01".into()),
        }
    }

    fn memory_service() -> PatientService {
        PatientService::new(Arc::new(MemoryPatientRepository::new()))
    }

    fn sqlite_service() -> PatientService {
        PatientService::new(Arc::new(
            SqlitePatientRepository::open_in_memory().expect("open sqlite"),
        ))
    }

    fn both_services() -> [PatientService; 2] {
        [memory_service(), sqlite_service()]
    }

    fn id_of(res: &PatientResponse) -> PatientId {
        PatientId::parse(&res.id).expect("response id should parse")
    }

    #[test]
    fn list_is_empty_for_empty_store() {
        for svc in both_services() {
            assert!(svc.list_patients().expect("list").is_empty());
        }
    }

    #[test]
    fn create_echoes_input_with_fresh_id() {
        for svc in both_services() {
            let res = svc
                .create_patient(&request("Ann", "a@x.com"))
                .expect("create");

            assert!(!res.id.is_empty());
            assert_eq!(res.name, "Ann");
            assert_eq!(res.email, "a@x.com");
            assert_eq!(res.address, "1 Rd");
            assert_eq!(res.date_of_birth, "1990-01-01");

            let listed = svc.list_patients().expect("list");
            assert_eq!(listed, vec![res]);
        }
    }

    #[test]
    fn create_rejects_duplicate_email_without_persisting() {
        for svc in both_services() {
            svc.create_patient(&request("Ann", "a@x.com")).expect("first");

            let err = svc
                .create_patient(&request("Other", "a@x.com"))
                .expect_err("duplicate email");
            assert!(matches!(err, PatientError::EmailAlreadyExists(ref e) if e == "a@x.com"));
            assert_eq!(svc.list_patients().expect("list").len(), 1);
        }
    }

    #[test]
    fn create_reports_all_violations() {
        let svc = memory_service();
        let req = PatientRequest {
            email: Some("bad".into()),
            ..PatientRequest::default()
        };

        match svc.create_patient(&req).expect_err("invalid") {
            PatientError::Validation(errors) => {
                assert_eq!(errors.violations().len(), 5);
                assert!(errors.has_field(FIELD_NAME));
                assert!(errors.has_field(FIELD_EMAIL));
                assert!(errors.has_field(FIELD_REGISTERED_DATE));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(svc.list_patients().expect("list").is_empty());
    }

    #[test]
    fn create_requires_registered_date_but_update_does_not() {
        let svc = memory_service();
        let mut req = request("Ann", "a@x.com");
        req.registered_date = None;

        let err = svc.create_patient(&req).expect_err("missing registeredDate");
        assert!(matches!(
            err,
            PatientError::Validation(ref e) if e.has_field(FIELD_REGISTERED_DATE)
        ));

        let created = svc.create_patient(&request("Ann", "a@x.com")).expect("create");
        svc.update_patient(id_of(&created), &req)
            .expect("update without registeredDate");
    }

    #[test]
    fn create_with_malformed_registered_date_is_a_client_error() {
        let svc = memory_service();
        let mut req = request("Ann", "a@x.com");
        req.registered_date = Some("01-01-2024".into());

        let err = svc.create_patient(&req).expect_err("malformed date");
        assert!(matches!(err, PatientError::MalformedDate { .. }));
        assert!(!err.is_server_error());
    }

    #[test]
    fn update_may_keep_own_email() {
        for svc in both_services() {
            let created = svc.create_patient(&request("Ann", "a@x.com")).expect("create");

            let mut req = request("Ann Smith", "a@x.com");
            req.address = Some("2 Ave".into());
            let updated = svc
                .update_patient(id_of(&created), &req)
                .expect("self-exclusion");

            assert_eq!(updated.id, created.id);
            assert_eq!(updated.name, "Ann Smith");
            assert_eq!(updated.address, "2 Ave");
        }
    }

    #[test]
    fn update_rejects_email_of_another_patient() {
        for svc in both_services() {
            let ann = svc.create_patient(&request("Ann", "a@x.com")).expect("create");
            svc.create_patient(&request("Bea", "b@x.com")).expect("create");

            let err = svc
                .update_patient(id_of(&ann), &request("Ann", "b@x.com"))
                .expect_err("email owned by another");
            assert!(matches!(err, PatientError::EmailAlreadyExists(_)));

            let still = svc.get_patient(id_of(&ann)).expect("get");
            assert_eq!(still.email, "a@x.com");
        }
    }

    #[test]
    fn update_of_unknown_id_is_not_found_before_validation() {
        let svc = memory_service();
        let id = PatientId::new();

        let err = svc
            .update_patient(id, &PatientRequest::default())
            .expect_err("unknown id");
        assert!(matches!(err, PatientError::PatientNotFound(found) if found == id));
    }

    #[test]
    fn update_keeps_registered_date() {
        let repo = Arc::new(MemoryPatientRepository::new());
        let svc = PatientService::new(repo.clone());
        let created = svc.create_patient(&request("Ann", "a@x.com")).expect("create");

        let mut req = request("Ann", "a@x.com");
        req.registered_date = Some("1999-09-09".into());
        svc.update_patient(id_of(&created), &req).expect("update");

        let stored = repo
            .find_by_id(id_of(&created))
            .expect("lookup")
            .expect("present");
        assert_eq!(stored.registered_date.to_string(), "2024-01-01");
    }

    #[test]
    fn delete_is_idempotent() {
        for svc in both_services() {
            let created = svc.create_patient(&request("Ann", "a@x.com")).expect("create");
            let id = id_of(&created);

            svc.delete_patient(id).expect("delete");
            svc.delete_patient(id).expect("repeat delete");
            svc.delete_patient(PatientId::new()).expect("unknown id");

            let err = svc.get_patient(id).expect_err("gone");
            assert!(matches!(err, PatientError::PatientNotFound(_)));
        }
    }

    #[test]
    fn deleted_email_can_be_reused() {
        let svc = sqlite_service();
        let created = svc.create_patient(&request("Ann", "a@x.com")).expect("create");
        svc.delete_patient(id_of(&created)).expect("delete");

        svc.create_patient(&request("Ann again", "a@x.com"))
            .expect("email is free again");
    }

    /// Store whose pre-check always reports the email as free, so the write-time constraint is
    /// the only guard left.
    struct RacingRepository(MemoryPatientRepository);

    impl PatientRepository for RacingRepository {
        fn find_all(&self) -> RepoResult<Vec<Patient>> {
            self.0.find_all()
        }
        fn find_by_id(&self, id: PatientId) -> RepoResult<Option<Patient>> {
            self.0.find_by_id(id)
        }
        fn exists_by_email(&self, _email: &str) -> RepoResult<bool> {
            Ok(false)
        }
        fn exists_by_email_excluding(&self, _email: &str, _id: PatientId) -> RepoResult<bool> {
            Ok(false)
        }
        fn save(&self, draft: PatientDraft) -> RepoResult<Patient> {
            self.0.save(draft)
        }
        fn delete_by_id(&self, id: PatientId) -> RepoResult<bool> {
            self.0.delete_by_id(id)
        }
    }

    #[test]
    fn write_time_conflict_is_reported_as_email_already_exists() {
        let svc = PatientService::new(Arc::new(RacingRepository(MemoryPatientRepository::new())));
        svc.create_patient(&request("Ann", "a@x.com")).expect("first");

        let err = svc
            .create_patient(&request("Other", "a@x.com"))
            .expect_err("store rejects duplicate");
        assert!(matches!(err, PatientError::EmailAlreadyExists(_)));
    }

    struct FailingRepository;

    impl PatientRepository for FailingRepository {
        fn find_all(&self) -> RepoResult<Vec<Patient>> {
            Err(RepoError::LockPoisoned)
        }
        fn find_by_id(&self, _id: PatientId) -> RepoResult<Option<Patient>> {
            Err(RepoError::LockPoisoned)
        }
        fn exists_by_email(&self, _email: &str) -> RepoResult<bool> {
            Ok(false)
        }
        fn exists_by_email_excluding(&self, _email: &str, _id: PatientId) -> RepoResult<bool> {
            Ok(false)
        }
        fn save(&self, _draft: PatientDraft) -> RepoResult<Patient> {
            Err(RepoError::LockPoisoned)
        }
        fn delete_by_id(&self, _id: PatientId) -> RepoResult<bool> {
            Err(RepoError::LockPoisoned)
        }
    }

    #[test]
    fn store_failures_surface_as_persistence_errors() {
        let svc = PatientService::new(Arc::new(FailingRepository));

        assert!(svc.list_patients().expect_err("list").is_server_error());
        assert!(svc
            .create_patient(&request("Ann", "a@x.com"))
            .expect_err("create")
            .is_server_error());
        assert!(svc
            .delete_patient(PatientId::new())
            .expect_err("delete")
            .is_server_error());
        assert!(svc
            .get_patient(PatientId::new())
            .expect_err("get")
            .is_server_error());
        assert!(svc
            .update_patient(PatientId::new(), &request("Ann", "a@x.com"))
            .expect_err("update")
            .is_server_error());
    }

    #[test]
    fn scenario_create_then_duplicate() {
        let svc = sqlite_service();
        let res = svc
            .create_patient(&request("Ann", "a@x.com"))
            .expect("create");
        assert!(!res.id.is_empty());
        assert_eq!(res.email, "a@x.com");

        let err = svc
            .create_patient(&request("Ann", "a@x.com"))
            .expect_err("conflict");
        assert!(matches!(err, PatientError::EmailAlreadyExists(_)));
        assert_eq!(svc.list_patients().expect("list").len(), 1);
    }

    #[test]
    fn concurrent_creates_with_same_email_admit_one() {
        let svc = sqlite_service();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let svc = svc.clone();
                std::thread::spawn(move || {
                    svc.create_patient(&request(&format!("P{i}"), "same@x.com"))
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, PatientError::EmailAlreadyExists(_))));
        assert_eq!(svc.list_patients().expect("list").len(), 1);
    }
}
