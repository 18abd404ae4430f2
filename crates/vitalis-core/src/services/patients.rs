//! Patient registration and profile management.

use tracing::{info, warn};
use validator::Validate;

use super::{require_admin, ServiceError, ServiceResult};
use crate::db::{Database, DbError};
use crate::models::{Patient, PatientInput, Principal, Role};

pub struct PatientService<'a> {
    db: &'a Database,
}

impl<'a> PatientService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Register a patient profile. Email and cpf must be unused.
    pub fn register(&self, input: PatientInput) -> ServiceResult<Patient> {
        input.validate()?;
        self.ensure_unique(&input, None)?;

        let patient = Patient::from_input(input);
        self.db.insert_patient(&patient).map_err(duplicate_as_conflict)?;
        info!(patient_id = %patient.id, "Patient registered");
        Ok(patient)
    }

    /// Administrators and clinics see every patient.
    pub fn list(&self, principal: &Principal) -> ServiceResult<Vec<Patient>> {
        match principal.role {
            Role::Admin | Role::Clinic => Ok(self.db.list_patients()?),
            Role::Patient => Err(ServiceError::Forbidden(
                "patients may only read their own profile".into(),
            )),
        }
    }

    pub fn get(&self, principal: &Principal, id: &str) -> ServiceResult<Patient> {
        let patient = self.find(id)?;
        let allowed = match principal.role {
            Role::Admin | Role::Clinic => true,
            Role::Patient => principal.is_patient(&patient.id),
        };
        if !allowed {
            return Err(ServiceError::Forbidden(
                "patients may only read their own profile".into(),
            ));
        }
        Ok(patient)
    }

    /// Replace a profile. Only the owning patient or an administrator may do so.
    pub fn update(
        &self,
        principal: &Principal,
        id: &str,
        input: PatientInput,
    ) -> ServiceResult<Patient> {
        input.validate()?;
        let mut patient = self.find(id)?;
        if !(principal.is_admin() || principal.is_patient(&patient.id)) {
            return Err(ServiceError::Forbidden(
                "only the patient or an administrator may update this profile".into(),
            ));
        }
        self.ensure_unique(&input, Some(&patient.id))?;

        patient.apply(input);
        self.db.update_patient(&patient).map_err(duplicate_as_conflict)?;
        info!(patient_id = %patient.id, "Patient updated");
        Ok(patient)
    }

    /// Soft-delete a profile and disable the accounts acting for it.
    pub fn deactivate(&self, principal: &Principal, id: &str) -> ServiceResult<()> {
        require_admin(principal)?;
        let patient = self.find(id)?;

        self.db.atomic(|db| -> ServiceResult<()> {
            db.deactivate_patient(&patient.id)?;
            db.deactivate_users_for_profile(&patient.id)?;
            Ok(())
        })?;
        info!(patient_id = %patient.id, "Patient deactivated");
        Ok(())
    }

    fn find(&self, id: &str) -> ServiceResult<Patient> {
        self.db
            .get_patient(id)?
            .ok_or_else(|| ServiceError::not_found("patient", id))
    }

    /// Conflict if the email or cpf belongs to a patient other than `current`.
    fn ensure_unique(&self, input: &PatientInput, current: Option<&str>) -> ServiceResult<()> {
        let taken = |found: Option<Patient>| match found {
            Some(other) => Some(other.id.as_str()) != current,
            None => false,
        };

        if taken(self.db.get_patient_by_email(&input.email)?) {
            warn!(email = %input.email, "Patient email already registered");
            return Err(ServiceError::Conflict(format!(
                "email {} is already registered",
                input.email
            )));
        }
        if taken(self.db.get_patient_by_cpf(&input.cpf)?) {
            warn!("Patient cpf already registered");
            return Err(ServiceError::Conflict("cpf is already registered".into()));
        }
        Ok(())
    }
}

fn duplicate_as_conflict(err: DbError) -> ServiceError {
    match err {
        DbError::Duplicate(_) => ServiceError::Conflict("email or cpf is already registered".into()),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::*;
    use chrono::NaiveDate;

    fn input(email: &str, cpf: &str) -> PatientInput {
        PatientInput {
            name: "Joao Lima".into(),
            cpf: cpf.into(),
            email: email.into(),
            phone: "11955554444".into(),
            birth_date: NaiveDate::from_ymd_opt(1979, 11, 2).unwrap(),
            address: None,
            medical_history: Some("Asthma".into()),
        }
    }

    #[test]
    fn test_register_conflicts_on_email_and_cpf() {
        let db = setup_db();
        let service = PatientService::new(&db);
        service.register(input("x@y.com", "11111111111")).unwrap();

        assert!(matches!(
            service.register(input("x@y.com", "22222222222")),
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            service.register(input("z@y.com", "11111111111")),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn test_register_validates() {
        let db = setup_db();
        let service = PatientService::new(&db);
        assert!(matches!(
            service.register(input("not-an-email", "11111111111")),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_visibility() {
        let db = setup_db();
        let service = PatientService::new(&db);
        let joao = service.register(input("joao@y.com", "11111111111")).unwrap();
        let ana = service.register(input("ana@y.com", "22222222222")).unwrap();
        let clinic = insert_clinic(&db, "CardioPulse");

        assert_eq!(service.list(&admin()).unwrap().len(), 2);
        assert_eq!(service.list(&as_clinic(&clinic)).unwrap().len(), 2);
        assert!(matches!(
            service.list(&as_patient(&joao)),
            Err(ServiceError::Forbidden(_))
        ));

        assert!(service.get(&as_patient(&joao), &joao.id).is_ok());
        assert!(service.get(&as_clinic(&clinic), &joao.id).is_ok());
        assert!(matches!(
            service.get(&as_patient(&ana), &joao.id),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn test_update_own_profile() {
        let db = setup_db();
        let service = PatientService::new(&db);
        let joao = service.register(input("joao@y.com", "11111111111")).unwrap();
        let ana = service.register(input("ana@y.com", "22222222222")).unwrap();

        // keeping one's own email and cpf is not a conflict
        let mut changes = input("joao@y.com", "11111111111");
        changes.phone = "11900001111".into();
        let updated = service.update(&as_patient(&joao), &joao.id, changes).unwrap();
        assert_eq!(updated.phone, "11900001111");

        assert!(matches!(
            service.update(&as_patient(&joao), &joao.id, input("ana@y.com", "11111111111")),
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            service.update(&as_patient(&ana), &joao.id, input("joao@y.com", "11111111111")),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn test_deactivate_admin_only() {
        let db = setup_db();
        let service = PatientService::new(&db);
        let joao = service.register(input("joao@y.com", "11111111111")).unwrap();

        assert!(matches!(
            service.deactivate(&as_patient(&joao), &joao.id),
            Err(ServiceError::Forbidden(_))
        ));
        service.deactivate(&admin(), &joao.id).unwrap();
        assert!(!service.get(&admin(), &joao.id).unwrap().active);
    }
}
