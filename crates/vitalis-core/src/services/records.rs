//! Clinical records.

use tracing::{info, warn};
use validator::Validate;

use super::appointments::can_view;
use super::{require_clinic_manager, ServiceError, ServiceResult};
use crate::db::{Database, DbError};
use crate::models::{AppointmentStatus, ClinicalRecord, Principal, RecordInput};

pub struct RecordService<'a> {
    db: &'a Database,
}

impl<'a> RecordService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Attach the clinical record of a confirmed or completed appointment.
    /// Each appointment has at most one record.
    pub fn register(
        &self,
        principal: &Principal,
        appointment_id: &str,
        input: RecordInput,
    ) -> ServiceResult<ClinicalRecord> {
        input.validate()?;
        let appointment = self
            .db
            .get_appointment(appointment_id)?
            .ok_or_else(|| ServiceError::not_found("appointment", appointment_id))?;
        require_clinic_manager(principal, &appointment.clinic_id)?;

        if !matches!(
            appointment.status,
            AppointmentStatus::Confirmed | AppointmentStatus::Done
        ) {
            warn!(appointment_id, status = %appointment.status, "Record rejected");
            return Err(ServiceError::BusinessRule(
                "records require a confirmed or completed appointment".into(),
            ));
        }
        let already = || ServiceError::BusinessRule("appointment already has a record".into());
        if self.db.get_record_for_appointment(appointment_id)?.is_some() {
            return Err(already());
        }

        let record = ClinicalRecord::new(appointment.id, input);
        self.db.insert_record(&record).map_err(|e| match e {
            DbError::Duplicate(_) => already(),
            other => other.into(),
        })?;
        info!(appointment_id, record_id = %record.id, "Clinical record registered");
        Ok(record)
    }

    /// The record of an appointment, if one was registered.
    pub fn get_for_appointment(
        &self,
        principal: &Principal,
        appointment_id: &str,
    ) -> ServiceResult<Option<ClinicalRecord>> {
        let appointment = self
            .db
            .get_appointment(appointment_id)?
            .ok_or_else(|| ServiceError::not_found("appointment", appointment_id))?;
        if !can_view(principal, &appointment) {
            return Err(ServiceError::Forbidden("not allowed to view this record".into()));
        }
        Ok(self.db.get_record_for_appointment(appointment_id)?)
    }
}
