//! Clinic management.

use tracing::info;
use validator::Validate;

use super::{require_admin, require_clinic_manager, ServiceError, ServiceResult};
use crate::db::Database;
use crate::models::{Clinic, ClinicInput, Principal};

pub struct ClinicService<'a> {
    db: &'a Database,
}

impl<'a> ClinicService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Register a clinic. Administrators only.
    pub fn create(&self, principal: &Principal, input: ClinicInput) -> ServiceResult<Clinic> {
        require_admin(principal)?;
        input.validate()?;

        let clinic = Clinic::from_input(input);
        self.db.insert_clinic(&clinic)?;
        info!(clinic_id = %clinic.id, trade_name = %clinic.trade_name, "Clinic created");
        Ok(clinic)
    }

    /// Active clinics, optionally of one specialty.
    pub fn list(&self, specialty: Option<&str>) -> ServiceResult<Vec<Clinic>> {
        let specialty = specialty.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.db.list_clinics(specialty)?)
    }

    pub fn get(&self, id: &str) -> ServiceResult<Clinic> {
        self.db
            .get_clinic(id)?
            .ok_or_else(|| ServiceError::not_found("clinic", id))
    }

    pub fn update(
        &self,
        principal: &Principal,
        id: &str,
        input: ClinicInput,
    ) -> ServiceResult<Clinic> {
        input.validate()?;
        let mut clinic = self.get(id)?;
        require_clinic_manager(principal, &clinic.id)?;

        clinic.apply(input);
        self.db.update_clinic(&clinic)?;
        info!(clinic_id = %clinic.id, "Clinic updated");
        Ok(clinic)
    }

    /// Soft-delete a clinic.
    pub fn deactivate(&self, principal: &Principal, id: &str) -> ServiceResult<()> {
        let clinic = self.get(id)?;
        require_clinic_manager(principal, &clinic.id)?;

        self.db.deactivate_clinic(&clinic.id)?;
        info!(clinic_id = %clinic.id, "Clinic deactivated");
        Ok(())
    }
}
