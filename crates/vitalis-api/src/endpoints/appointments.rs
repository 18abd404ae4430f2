//! Appointment endpoints: booking, listing, status transitions and the
//! attached clinical record.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use vitalis_core::models::{NewAppointment, RecordInput};
use vitalis_core::services::{AppointmentFilter, AppointmentService, RecordService};
use vitalis_core::{Appointment, AppointmentDetails, AppointmentStatus, ClinicalRecord};

use crate::error::ApiError;
use crate::types::{ApiContext, CallerContext};

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureSelection {
    pub procedure_ids: Vec<String>,
}

/// `POST /appointments`
pub async fn book(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Json(request): Json<NewAppointment>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let appointment =
        ctx.with_db(|db| AppointmentService::new(db).book(&caller.principal, request))?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// `GET /appointments[?clinicId=&patientId=]`
///
/// Patients and clinics always see their own appointments; the filter only
/// applies to administrators.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Vec<AppointmentDetails>>, ApiError> {
    let appointments =
        ctx.with_db(|db| AppointmentService::new(db).list_for(&caller.principal, &filter))?;
    Ok(Json(appointments))
}

/// `GET /appointments/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentDetails>, ApiError> {
    let details = ctx.with_db(|db| AppointmentService::new(db).get(&caller.principal, &id))?;
    Ok(Json(details))
}

/// `PATCH /appointments/:id/status?status=`
pub async fn update_status(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<StatusCode, ApiError> {
    ctx.with_db(|db| {
        AppointmentService::new(db).transition(&caller.principal, &id, query.status)
    })?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /appointments/:id/cancel`
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.with_db(|db| AppointmentService::new(db).cancel(&caller.principal, &id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /appointments/:id/procedures`
pub async fn replace_procedures(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(selection): Json<ProcedureSelection>,
) -> Result<Json<Appointment>, ApiError> {
    let appointment = ctx.with_db(|db| {
        AppointmentService::new(db).replace_procedures(
            &caller.principal,
            &id,
            selection.procedure_ids,
        )
    })?;
    Ok(Json(appointment))
}

/// `POST /appointments/:id/record`
pub async fn add_record(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(input): Json<RecordInput>,
) -> Result<(StatusCode, Json<ClinicalRecord>), ApiError> {
    let record =
        ctx.with_db(|db| RecordService::new(db).register(&caller.principal, &id, input))?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /appointments/:id/record`
pub async fn get_record(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Json<ClinicalRecord>, ApiError> {
    ctx.with_db(|db| RecordService::new(db).get_for_appointment(&caller.principal, &id))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("appointment {} has no record", id)))
}
