//! Patient/plan store.
//!
//! Facade over the repository functions. Every operation opens its own
//! connection and drops it before returning; the store itself only holds
//! the database path and the credential verifier.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;

use crate::config;
use crate::crypto::{CredentialVerifier, CryptoError};
use crate::db::{self, DatabaseError};
use crate::diet::{BodyProfile, PlanGenerator};
use crate::models::*;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Already registered: {field} is in use")]
    AlreadyRegistered { field: String },

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Patient not found: {0}")]
    PatientNotFound(i64),

    #[error("Stored credential unusable: {0}")]
    Credential(#[from] CryptoError),

    #[error("Cannot prepare data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(DatabaseError),
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation { column, .. } => {
                StoreError::AlreadyRegistered { field: column }
            }
            other => StoreError::Database(other),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        DatabaseError::classify(err).into()
    }
}

/// Plan counts shown on the doctor dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanCounts {
    pub patients: i64,
    pub assigned: i64,
    pub generated: i64,
}

pub struct Store {
    db_path: PathBuf,
    verifier: Arc<dyn CredentialVerifier>,
    /// Checked against on unknown identifiers so both failure paths cost
    /// one derivation.
    decoy: String,
}

impl Store {
    /// Create the data directory, migrate the schema and seed the default doctor.
    pub fn init(db_path: &Path, verifier: Arc<dyn CredentialVerifier>) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Migrations run once here; later connections skip them.
        db::open_database(db_path)?;

        let decoy = verifier.hash("decoy-credential");
        let store = Self {
            db_path: db_path.to_path_buf(),
            verifier,
            decoy,
        };
        store.seed_default_doctor()?;

        tracing::info!(path = %db_path.display(), "Store ready");
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        Ok(db::connect(&self.db_path)?)
    }

    /// Insert the seed doctor unless a doctor with that email exists.
    pub fn seed_default_doctor(&self) -> Result<bool, StoreError> {
        let conn = self.connect()?;
        if db::get_doctor_by_email(&conn, config::SEED_DOCTOR_EMAIL)?.is_some() {
            return Ok(false);
        }

        let credential = self.verifier.hash(config::SEED_DOCTOR_PASSWORD);
        let id = db::insert_doctor(
            &conn,
            config::SEED_DOCTOR_NAME,
            config::SEED_DOCTOR_EMAIL,
            &credential,
        )?;
        tracing::info!(doctor_id = id, email = config::SEED_DOCTOR_EMAIL, "Seeded default doctor");
        Ok(true)
    }

    /// Look up a doctor (by numeric id or email) or a patient (by email or
    /// phone) and check the password.
    ///
    /// Unknown identifier and wrong password both yield `Ok(None)`.
    pub fn authenticate(
        &self,
        role: Role,
        identifier: &str,
        password: &str,
    ) -> Result<Option<Identity>, StoreError> {
        let identifier = normalize_identifier(identifier);
        let conn = self.connect()?;

        let found = match role {
            Role::Doctor => match identifier.parse::<i64>() {
                Ok(id) => db::get_doctor(&conn, id)?,
                Err(_) => db::get_doctor_by_email(&conn, &identifier)?,
            }
            .map(|d| (d.password.clone(), Identity::from(&d))),
            Role::Patient => db::find_patient_by_login(&conn, &identifier)?
                .map(|p| (p.password.clone(), Identity::from(&p))),
        };
        drop(conn);

        match found {
            Some((credential, identity)) => {
                if self.verifier.verify(password, &credential)? {
                    tracing::info!(role = role.as_str(), user_id = identity.id(), "Login succeeded");
                    Ok(Some(identity))
                } else {
                    tracing::info!(role = role.as_str(), "Login failed");
                    Ok(None)
                }
            }
            None => {
                let _ = self.verifier.verify(password, &self.decoy);
                tracing::info!(role = role.as_str(), "Login failed");
                Ok(None)
            }
        }
    }

    /// Validate and insert a new patient. Returns the new id.
    pub fn register_patient(&self, registration: &Registration) -> Result<i64, StoreError> {
        let mut reg = registration.clone();
        reg.email = normalize_identifier(&reg.email);
        reg.phone = reg.phone.trim().to_string();

        let errors = reg.validate();
        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        let credential = self.verifier.hash(&reg.password);
        let conn = self.connect()?;
        let id = db::insert_patient(&conn, &reg, &credential)?;
        tracing::info!(patient_id = id, "Patient registered");
        Ok(id)
    }

    pub fn get_patient(&self, patient_id: i64) -> Result<Option<Patient>, StoreError> {
        let conn = self.connect()?;
        Ok(db::get_patient(&conn, patient_id)?)
    }

    /// All patients, insertion order.
    pub fn list_patients(&self) -> Result<Vec<PatientSummary>, StoreError> {
        let conn = self.connect()?;
        Ok(db::list_patient_summaries(&conn)?)
    }

    /// Replace the patient's plan with a doctor-assigned one.
    pub fn assign_plan(
        &self,
        patient_id: i64,
        plan: &MealPlan,
        assigned_by: Option<i64>,
    ) -> Result<DietPlan, StoreError> {
        if plan.has_blank_meal() {
            return Err(StoreError::Validation(vec![
                "Breakfast, lunch and dinner are all required".to_string(),
            ]));
        }
        self.write_plan(patient_id, plan, PlanSource::Assigned, assigned_by)
    }

    /// Store a generated plan, replacing any existing one.
    pub fn save_generated_plan(&self, patient_id: i64, plan: &MealPlan) -> Result<DietPlan, StoreError> {
        self.write_plan(patient_id, plan, PlanSource::Generated, None)
    }

    fn write_plan(
        &self,
        patient_id: i64,
        plan: &MealPlan,
        source: PlanSource,
        assigned_by: Option<i64>,
    ) -> Result<DietPlan, StoreError> {
        let conn = self.connect()?;
        match db::upsert_plan(&conn, patient_id, plan, source, assigned_by) {
            Ok(_) => {}
            Err(DatabaseError::NotFound { .. }) => return Err(StoreError::PatientNotFound(patient_id)),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(patient_id, source = source.as_str(), "Diet plan stored");

        db::get_plan(&conn, patient_id)?.ok_or(StoreError::PatientNotFound(patient_id))
    }

    /// The patient's current plan; `None` when nothing was assigned or generated.
    pub fn fetch_plan(&self, patient_id: i64) -> Result<Option<DietPlan>, StoreError> {
        let conn = self.connect()?;
        Ok(db::get_plan(&conn, patient_id)?)
    }

    /// Return the existing plan, or generate and store one.
    ///
    /// Never overwrites a plan that is already there.
    pub fn ensure_plan(
        &self,
        patient_id: i64,
        generator: &dyn PlanGenerator,
    ) -> Result<DietPlan, StoreError> {
        if let Some(plan) = self.fetch_plan(patient_id)? {
            return Ok(plan);
        }
        let patient = self
            .get_patient(patient_id)?
            .ok_or(StoreError::PatientNotFound(patient_id))?;

        let generated = generator.generate(&BodyProfile::from(&patient));
        tracing::debug!(
            patient_id,
            generator = generator.name(),
            category = generated.category.as_str(),
            bypassed = generated.filter_bypassed.len(),
            "Generated diet plan"
        );
        self.save_generated_plan(patient_id, &generated.meals)
    }

    pub fn plan_counts(&self) -> Result<PlanCounts, StoreError> {
        let conn = self.connect()?;
        Ok(PlanCounts {
            patients: db::count_patients(&conn)?,
            assigned: db::count_plans_by_source(&conn, PlanSource::Assigned)?,
            generated: db::count_plans_by_source(&conn, PlanSource::Generated)?,
        })
    }
}

/// Emails compare case-insensitively; phones as typed, minus whitespace.
fn normalize_identifier(identifier: &str) -> String {
    let trimmed = identifier.trim();
    if trimmed.contains('@') {
        trimmed.to_lowercase()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::crypto::Pbkdf2Verifier;
    use crate::diet::{generate_plan, BmiTemplateGenerator};

    pub(crate) fn test_store() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::init(
            &dir.path().join("ayurdiet.db"),
            Arc::new(Pbkdf2Verifier::new(1_000)),
        )
        .unwrap();
        (store, dir)
    }

    pub(crate) fn registration(email: &str, phone: &str) -> Registration {
        Registration {
            full_name: "Sunita Devi".into(),
            phone: phone.into(),
            email: email.into(),
            password: "sunita-pw".into(),
            height_cm: 160.0,
            weight_kg: 50.0,
            working_days: 5,
            diseases: String::new(),
        }
    }

    #[test]
    fn seed_doctor_is_idempotent() {
        let (store, _dir) = test_store();
        assert!(!store.seed_default_doctor().unwrap());

        let conn = db::connect(store.db_path()).unwrap();
        assert_eq!(db::count_doctors(&conn).unwrap(), 1);
    }

    #[test]
    fn reinit_keeps_single_seed() {
        let (store, _dir) = test_store();
        let again = Store::init(store.db_path(), Arc::new(Pbkdf2Verifier::new(1_000))).unwrap();
        let conn = db::connect(again.db_path()).unwrap();
        assert_eq!(db::count_doctors(&conn).unwrap(), 1);
    }

    #[test]
    fn seeded_doctor_can_log_in() {
        let (store, _dir) = test_store();
        let identity = store
            .authenticate(Role::Doctor, config::SEED_DOCTOR_EMAIL, config::SEED_DOCTOR_PASSWORD)
            .unwrap()
            .unwrap();
        assert_eq!(identity.role(), Role::Doctor);
        assert_eq!(identity.display_name(), config::SEED_DOCTOR_NAME);
    }

    #[test]
    fn doctor_can_log_in_by_id() {
        let (store, _dir) = test_store();
        let conn = db::connect(store.db_path()).unwrap();
        let doctor = db::get_doctor_by_email(&conn, config::SEED_DOCTOR_EMAIL).unwrap().unwrap();

        let identity = store
            .authenticate(Role::Doctor, &doctor.id.to_string(), config::SEED_DOCTOR_PASSWORD)
            .unwrap()
            .unwrap();
        assert_eq!(identity.id(), doctor.id);

        assert!(store
            .authenticate(Role::Doctor, &doctor.id.to_string(), "wrong")
            .unwrap()
            .is_none());
        assert!(store
            .authenticate(Role::Doctor, "9999", config::SEED_DOCTOR_PASSWORD)
            .unwrap()
            .is_none());
    }

    #[test]
    fn seed_password_not_stored_in_plaintext() {
        let (store, _dir) = test_store();
        let conn = db::connect(store.db_path()).unwrap();
        let doctor = db::get_doctor_by_email(&conn, config::SEED_DOCTOR_EMAIL).unwrap().unwrap();
        assert_ne!(doctor.password, config::SEED_DOCTOR_PASSWORD);
        assert!(doctor.password.starts_with("pbkdf2-sha256$"));
    }

    #[test]
    fn register_then_authenticate_returns_same_identity() {
        let (store, _dir) = test_store();
        let id = store.register_patient(&registration("sunita@x.in", "9111111111")).unwrap();

        let by_email = store
            .authenticate(Role::Patient, "Sunita@X.in", "sunita-pw")
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id(), id);

        let by_phone = store
            .authenticate(Role::Patient, "9111111111", "sunita-pw")
            .unwrap()
            .unwrap();
        assert_eq!(by_phone, by_email);
    }

    #[test]
    fn wrong_password_and_unknown_user_both_none() {
        let (store, _dir) = test_store();
        store.register_patient(&registration("sunita@x.in", "9111111111")).unwrap();

        assert!(store.authenticate(Role::Patient, "sunita@x.in", "nope").unwrap().is_none());
        assert!(store.authenticate(Role::Patient, "ghost@x.in", "sunita-pw").unwrap().is_none());
    }

    #[test]
    fn patient_cannot_log_in_as_doctor() {
        let (store, _dir) = test_store();
        store.register_patient(&registration("sunita@x.in", "9111111111")).unwrap();
        assert!(store.authenticate(Role::Doctor, "sunita@x.in", "sunita-pw").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_rejected_without_new_row() {
        let (store, _dir) = test_store();
        store.register_patient(&registration("sunita@x.in", "9111111111")).unwrap();

        let err = store
            .register_patient(&registration("SUNITA@x.in", "9222222222"))
            .unwrap_err();
        match err {
            StoreError::AlreadyRegistered { field } => assert_eq!(field, "email"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.list_patients().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_phone_rejected() {
        let (store, _dir) = test_store();
        store.register_patient(&registration("a@x.in", "9111111111")).unwrap();
        let err = store.register_patient(&registration("b@x.in", "9111111111")).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyRegistered { ref field } if field == "phone"));
    }

    #[test]
    fn invalid_registration_rejected() {
        let (store, _dir) = test_store();
        let mut reg = registration("a@x.in", "123");
        reg.working_days = 0;
        match store.register_patient(&reg).unwrap_err() {
            StoreError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.list_patients().unwrap().is_empty());
    }

    #[test]
    fn assign_then_fetch_returns_exact_meals() {
        let (store, _dir) = test_store();
        let id = store.register_patient(&registration("a@x.in", "9111111111")).unwrap();

        let plan = MealPlan::from_descriptions("Poha", "Dal rice", "Khichdi");
        store.assign_plan(id, &plan, Some(1)).unwrap();
        let stored = store.fetch_plan(id).unwrap().unwrap();
        assert_eq!(stored.meals, plan);
        assert_eq!(stored.source, PlanSource::Assigned);
        assert_eq!(stored.assigned_by, Some(1));

        let replacement = MealPlan::from_descriptions("Upma", "Roti sabzi", "Soup");
        store.assign_plan(id, &replacement, Some(1)).unwrap();
        let stored = store.fetch_plan(id).unwrap().unwrap();
        assert_eq!(stored.meals, replacement);
        assert_eq!(store.plan_counts().unwrap().assigned, 1);
    }

    #[test]
    fn assign_to_unknown_patient_fails() {
        let (store, _dir) = test_store();
        let plan = MealPlan::from_descriptions("Poha", "Dal rice", "Khichdi");
        assert!(matches!(
            store.assign_plan(99, &plan, None),
            Err(StoreError::PatientNotFound(99))
        ));
    }

    #[test]
    fn blank_meal_rejected() {
        let (store, _dir) = test_store();
        let id = store.register_patient(&registration("a@x.in", "9111111111")).unwrap();
        let plan = MealPlan::from_descriptions("Poha", "", "Khichdi");
        assert!(matches!(store.assign_plan(id, &plan, None), Err(StoreError::Validation(_))));
        assert!(store.fetch_plan(id).unwrap().is_none());
    }

    #[test]
    fn fetch_without_plan_is_none() {
        let (store, _dir) = test_store();
        let id = store.register_patient(&registration("a@x.in", "9111111111")).unwrap();
        assert!(store.fetch_plan(id).unwrap().is_none());
        assert!(store.fetch_plan(12345).unwrap().is_none());
    }

    #[test]
    fn ensure_plan_generates_once() {
        let (store, _dir) = test_store();
        let id = store.register_patient(&registration("a@x.in", "9111111111")).unwrap();

        let plan = store.ensure_plan(id, &BmiTemplateGenerator).unwrap();
        assert_eq!(plan.source, PlanSource::Generated);
        assert_eq!(plan.meals, generate_plan(50.0, 160.0, ""));

        let assigned = MealPlan::from_descriptions("Poha", "Dal rice", "Khichdi");
        store.assign_plan(id, &assigned, None).unwrap();
        let kept = store.ensure_plan(id, &BmiTemplateGenerator).unwrap();
        assert_eq!(kept.meals, assigned);
    }
}
