//! Appointment booking and the appointment status machine.

use std::collections::HashSet;

use chrono::{SubsecRound, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use super::{ServiceError, ServiceResult};
use crate::db::Database;
use crate::models::{
    Appointment, AppointmentDetails, AppointmentStatus, NewAppointment, Principal, Procedure,
    Role, Transition,
};

/// Optional filters for listing appointments. Administrators must set one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFilter {
    pub clinic_id: Option<String>,
    pub patient_id: Option<String>,
}

pub struct AppointmentService<'a> {
    db: &'a Database,
}

impl<'a> AppointmentService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Book an appointment for the calling patient.
    ///
    /// The appointment row and its procedure links are written in one
    /// unit of work.
    pub fn book(&self, principal: &Principal, request: NewAppointment) -> ServiceResult<Appointment> {
        request.validate()?;
        if principal.role != Role::Patient {
            return Err(ServiceError::Forbidden("only patients may book appointments".into()));
        }
        let patient_id = principal.profile_id.as_deref().ok_or_else(|| {
            ServiceError::Forbidden("account is not linked to a patient profile".into())
        })?;
        // stored with whole-second precision
        let scheduled_at = request.scheduled_at.trunc_subsecs(0);
        if scheduled_at <= Utc::now().naive_utc() {
            return Err(ServiceError::Validation(
                "scheduledAt: must be in the future".into(),
            ));
        }

        let patient = self
            .db
            .get_patient(patient_id)?
            .ok_or_else(|| ServiceError::not_found("patient", patient_id))?;
        if !patient.active {
            return Err(ServiceError::BusinessRule("patient profile is not active".into()));
        }
        let clinic = self
            .db
            .get_clinic(&request.clinic_id)?
            .ok_or_else(|| ServiceError::not_found("clinic", &request.clinic_id))?;
        if !clinic.active {
            warn!(clinic_id = %clinic.id, "Booking rejected for inactive clinic");
            return Err(ServiceError::BusinessRule(format!(
                "clinic {} is not accepting appointments",
                clinic.trade_name
            )));
        }

        let procedures = self.resolve_procedures(&clinic.id, &request.procedure_ids)?;
        let appointment = Appointment::new(
            patient.id,
            clinic.id,
            &procedures,
            scheduled_at,
            request.notes,
        );
        self.db
            .atomic(|db| -> ServiceResult<()> { Ok(db.insert_appointment(&appointment)?) })?;

        info!(
            appointment_id = %appointment.id,
            clinic_id = %appointment.clinic_id,
            total = %appointment.total_price,
            "Appointment booked"
        );
        Ok(appointment)
    }

    /// Resolve procedure ids for a booking at `clinic_id`.
    ///
    /// Every id is resolved before any membership or availability check, so
    /// the error reported does not depend on the order of the ids.
    fn resolve_procedures(&self, clinic_id: &str, ids: &[String]) -> ServiceResult<Vec<Procedure>> {
        if ids.is_empty() {
            return Err(ServiceError::Validation(
                "procedureIds: select at least one procedure".into(),
            ));
        }
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id.as_str()) {
                return Err(ServiceError::Validation(format!(
                    "procedureIds: procedure {} is listed twice",
                    id
                )));
            }
        }

        let procedures = ids
            .iter()
            .map(|id| {
                self.db
                    .get_procedure(id)?
                    .ok_or_else(|| ServiceError::not_found("procedure", id))
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        if let Some(foreign) = procedures.iter().find(|p| p.clinic_id != clinic_id) {
            warn!(procedure_id = %foreign.id, clinic_id, "Procedure belongs to another clinic");
            return Err(ServiceError::BusinessRule(format!(
                "procedure {} is not offered by this clinic",
                foreign.name
            )));
        }
        if let Some(unavailable) = procedures.iter().find(|p| !p.available) {
            warn!(procedure_id = %unavailable.id, "Procedure unavailable");
            return Err(ServiceError::BusinessRule(format!(
                "procedure {} is not available",
                unavailable.name
            )));
        }
        Ok(procedures)
    }

    /// Move an appointment to `requested`.
    ///
    /// Only the owning clinic may confirm or complete; only the appointment's
    /// patient may cancel. Allowed moves come from
    /// [`AppointmentStatus::transition_to`].
    pub fn transition(
        &self,
        principal: &Principal,
        id: &str,
        requested: AppointmentStatus,
    ) -> ServiceResult<Appointment> {
        let mut appointment = self.find(id)?;

        let permitted = match requested {
            AppointmentStatus::Confirmed | AppointmentStatus::Done => {
                principal.owns_clinic(&appointment.clinic_id)
            }
            AppointmentStatus::Cancelled => principal.is_patient(&appointment.patient_id),
            AppointmentStatus::Pending => {
                principal.owns_clinic(&appointment.clinic_id)
                    || principal.is_patient(&appointment.patient_id)
            }
        };
        if !permitted {
            return Err(ServiceError::Forbidden(format!(
                "not allowed to set this appointment to {}",
                requested
            )));
        }

        if let Transition::Deny(reason) = appointment.status.transition_to(requested) {
            warn!(
                appointment_id = %appointment.id,
                from = %appointment.status,
                to = %requested,
                "Transition denied"
            );
            return Err(ServiceError::BusinessRule(reason.to_string()));
        }

        let from = appointment.status;
        appointment.status = requested;
        appointment.touch();
        self.db
            .update_appointment_status(&appointment.id, requested, &appointment.updated_at)?;

        info!(appointment_id = %appointment.id, %from, to = %requested, "Appointment status changed");
        Ok(appointment)
    }

    pub fn confirm(&self, principal: &Principal, id: &str) -> ServiceResult<Appointment> {
        self.transition(principal, id, AppointmentStatus::Confirmed)
    }

    pub fn complete(&self, principal: &Principal, id: &str) -> ServiceResult<Appointment> {
        self.transition(principal, id, AppointmentStatus::Done)
    }

    pub fn cancel(&self, principal: &Principal, id: &str) -> ServiceResult<Appointment> {
        self.transition(principal, id, AppointmentStatus::Cancelled)
    }

    /// Swap the procedure set of an open appointment and recompute its total.
    pub fn replace_procedures(
        &self,
        principal: &Principal,
        id: &str,
        procedure_ids: Vec<String>,
    ) -> ServiceResult<Appointment> {
        let mut appointment = self.find(id)?;
        if !(principal.is_patient(&appointment.patient_id)
            || principal.owns_clinic(&appointment.clinic_id))
        {
            return Err(ServiceError::Forbidden(
                "only the patient or the clinic may change procedures".into(),
            ));
        }
        if !matches!(
            appointment.status,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        ) {
            return Err(ServiceError::BusinessRule(format!(
                "procedures of a {} appointment cannot change",
                appointment.status
            )));
        }

        let procedures = self.resolve_procedures(&appointment.clinic_id, &procedure_ids)?;
        appointment.set_procedures(&procedures);
        appointment.touch();
        self.db.atomic(|db| -> ServiceResult<()> {
            db.replace_appointment_procedures(&appointment)?;
            Ok(())
        })?;

        info!(
            appointment_id = %appointment.id,
            total = %appointment.total_price,
            "Appointment procedures replaced"
        );
        Ok(appointment)
    }

    pub fn list_for_patient(&self, patient_id: &str) -> ServiceResult<Vec<AppointmentDetails>> {
        self.db
            .list_appointments_for_patient(patient_id)?
            .into_iter()
            .map(|appointment| self.details(appointment))
            .collect()
    }

    pub fn list_for_clinic(&self, clinic_id: &str) -> ServiceResult<Vec<AppointmentDetails>> {
        self.db
            .list_appointments_for_clinic(clinic_id)?
            .into_iter()
            .map(|appointment| self.details(appointment))
            .collect()
    }

    /// Appointments visible to the caller.
    pub fn list_for(
        &self,
        principal: &Principal,
        filter: &AppointmentFilter,
    ) -> ServiceResult<Vec<AppointmentDetails>> {
        match principal.role {
            Role::Patient => self.list_for_patient(linked_profile(principal)?),
            Role::Clinic => self.list_for_clinic(linked_profile(principal)?),
            Role::Admin => match (&filter.clinic_id, &filter.patient_id) {
                (Some(clinic_id), _) => self.list_for_clinic(clinic_id),
                (None, Some(patient_id)) => self.list_for_patient(patient_id),
                (None, None) => Err(ServiceError::Validation(
                    "filter by clinicId or patientId".into(),
                )),
            },
        }
    }

    pub fn get(&self, principal: &Principal, id: &str) -> ServiceResult<AppointmentDetails> {
        let appointment = self.find(id)?;
        if !can_view(principal, &appointment) {
            return Err(ServiceError::Forbidden("not allowed to view this appointment".into()));
        }
        self.details(appointment)
    }

    fn find(&self, id: &str) -> ServiceResult<Appointment> {
        self.db
            .get_appointment(id)?
            .ok_or_else(|| ServiceError::not_found("appointment", id))
    }

    fn details(&self, appointment: Appointment) -> ServiceResult<AppointmentDetails> {
        let patient = self
            .db
            .get_patient(&appointment.patient_id)?
            .ok_or_else(|| ServiceError::not_found("patient", &appointment.patient_id))?;
        let clinic = self
            .db
            .get_clinic(&appointment.clinic_id)?
            .ok_or_else(|| ServiceError::not_found("clinic", &appointment.clinic_id))?;
        let procedures = self.db.list_appointment_procedures(&appointment.id)?;
        let record = self.db.get_record_for_appointment(&appointment.id)?;

        Ok(AppointmentDetails {
            id: appointment.id,
            patient_id: appointment.patient_id,
            patient_name: patient.name,
            clinic_id: appointment.clinic_id,
            clinic_name: clinic.trade_name,
            procedures,
            scheduled_at: appointment.scheduled_at,
            total_price: appointment.total_price,
            status: appointment.status,
            notes: appointment.notes,
            record,
        })
    }
}

/// Whether the caller may read an appointment.
pub(crate) fn can_view(principal: &Principal, appointment: &Appointment) -> bool {
    principal.is_admin()
        || principal.is_patient(&appointment.patient_id)
        || principal.owns_clinic(&appointment.clinic_id)
}

fn linked_profile(principal: &Principal) -> ServiceResult<&str> {
    principal
        .profile_id
        .as_deref()
        .ok_or_else(|| ServiceError::Forbidden("account is not linked to a profile".into()))
}
