//! Domain services.
//!
//! Each service borrows the [`Database`](crate::db::Database) for the
//! duration of one operation and enforces the business rules and
//! capability checks of its area.

mod appointments;
mod auth;
mod clinics;
mod patients;
mod procedures;
mod ratings;
mod records;
mod reports;
mod requisitions;

pub use appointments::{AppointmentFilter, AppointmentService};
pub use auth::{verify_password, AuthService, DEFAULT_TOKEN_TTL_HOURS};
pub use clinics::ClinicService;
pub use patients::PatientService;
pub use procedures::ProcedureService;
pub use ratings::RatingService;
pub use records::RecordService;
pub use reports::ReportService;
pub use requisitions::RequisitionService;

use thiserror::Error;

use crate::db::DbError;
use crate::models::Principal;

/// Service errors.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BusinessRule(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: invalid ({})", field, e.code),
                })
            })
            .collect();
        messages.sort();
        ServiceError::Validation(messages.join("; "))
    }
}

impl ServiceError {
    pub(crate) fn not_found(what: &str, id: &str) -> Self {
        ServiceError::NotFound(format!("{} {} not found", what, id))
    }
}

/// Fail unless the caller is an administrator.
pub fn require_admin(principal: &Principal) -> ServiceResult<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("administrator access required".into()))
    }
}

/// Fail unless the caller is an administrator or the clinic account owning `clinic_id`.
pub(crate) fn require_clinic_manager(principal: &Principal, clinic_id: &str) -> ServiceResult<()> {
    if principal.is_admin() || principal.owns_clinic(clinic_id) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "only an administrator or the owning clinic may do this".into(),
        ))
    }
}
