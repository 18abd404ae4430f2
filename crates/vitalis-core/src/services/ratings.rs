//! Appointment ratings and the clinic rating aggregate.

use tracing::{info, warn};
use validator::Validate;

use super::{ServiceError, ServiceResult};
use crate::db::{Database, DbError};
use crate::models::{AppointmentStatus, Principal, Rating, RatingInput};

pub struct RatingService<'a> {
    db: &'a Database,
}

impl<'a> RatingService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Rate a completed appointment and refresh the clinic's mean rating in
    /// the same unit of work.
    pub fn rate(&self, principal: &Principal, input: RatingInput) -> ServiceResult<Rating> {
        input.validate()?;
        let appointment = self
            .db
            .get_appointment(&input.appointment_id)?
            .ok_or_else(|| ServiceError::not_found("appointment", &input.appointment_id))?;

        if !principal.is_patient(&appointment.patient_id) {
            return Err(ServiceError::Forbidden(
                "only the appointment's patient may rate it".into(),
            ));
        }
        if appointment.status != AppointmentStatus::Done {
            warn!(appointment_id = %appointment.id, status = %appointment.status, "Rating rejected");
            return Err(ServiceError::BusinessRule(
                "only completed appointments can be rated".into(),
            ));
        }

        let rating = Rating::from_input(input);
        let clinic_rating = self.db.atomic(|db| -> ServiceResult<f64> {
            db.insert_rating(&rating).map_err(|e| match e {
                DbError::Duplicate(_) => {
                    ServiceError::BusinessRule("appointment already rated".into())
                }
                other => other.into(),
            })?;
            Ok(db.refresh_clinic_rating(&appointment.clinic_id)?)
        })?;

        info!(
            appointment_id = %appointment.id,
            clinic_id = %appointment.clinic_id,
            score = rating.score,
            clinic_rating,
            "Rating recorded"
        );
        Ok(rating)
    }
}
