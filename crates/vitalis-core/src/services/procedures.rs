//! Procedure catalog.

use rust_decimal::Decimal;
use tracing::{info, warn};
use validator::Validate;

use super::{require_clinic_manager, ServiceError, ServiceResult};
use crate::db::Database;
use crate::models::{Principal, Procedure, ProcedureInput, ProcedureListing};

pub struct ProcedureService<'a> {
    db: &'a Database,
}

impl<'a> ProcedureService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Add a procedure to an active clinic's catalog.
    pub fn create(&self, principal: &Principal, input: ProcedureInput) -> ServiceResult<Procedure> {
        input.validate()?;
        if input.price < Decimal::ZERO {
            return Err(ServiceError::Validation("price: must not be negative".into()));
        }

        let clinic = self
            .db
            .get_clinic(&input.clinic_id)?
            .ok_or_else(|| ServiceError::not_found("clinic", &input.clinic_id))?;
        require_clinic_manager(principal, &clinic.id)?;
        if !clinic.active {
            warn!(clinic_id = %clinic.id, "Procedure rejected for inactive clinic");
            return Err(ServiceError::BusinessRule(format!(
                "clinic {} is not active",
                clinic.trade_name
            )));
        }

        let procedure = Procedure::from_input(input);
        self.db.insert_procedure(&procedure)?;
        info!(procedure_id = %procedure.id, clinic_id = %clinic.id, "Procedure created");
        Ok(procedure)
    }

    /// Bookable procedures of a clinic.
    pub fn list_for_clinic(&self, clinic_id: &str) -> ServiceResult<Vec<ProcedureListing>> {
        if self.db.get_clinic(clinic_id)?.is_none() {
            return Err(ServiceError::not_found("clinic", clinic_id));
        }
        Ok(self.db.list_available_procedures(clinic_id)?)
    }

    pub fn get(&self, id: &str) -> ServiceResult<ProcedureListing> {
        self.db
            .get_procedure_listing(id)?
            .ok_or_else(|| ServiceError::not_found("procedure", id))
    }
}
