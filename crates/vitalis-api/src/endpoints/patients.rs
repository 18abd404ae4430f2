//! Patient endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use vitalis_core::models::PatientInput;
use vitalis_core::services::PatientService;
use vitalis_core::Patient;

use crate::error::ApiError;
use crate::types::{ApiContext, CallerContext};

/// `POST /patients`: public self-registration of a profile.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(input): Json<PatientInput>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let patient = ctx.with_db(|db| PatientService::new(db).register(input))?;
    Ok((StatusCode::CREATED, Json(patient)))
}

/// `GET /patients`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    Ok(Json(ctx.with_db(|db| PatientService::new(db).list(&caller.principal))?))
}

/// `GET /patients/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    Ok(Json(ctx.with_db(|db| PatientService::new(db).get(&caller.principal, &id))?))
}

/// `PUT /patients/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(input): Json<PatientInput>,
) -> Result<Json<Patient>, ApiError> {
    let patient =
        ctx.with_db(|db| PatientService::new(db).update(&caller.principal, &id, input))?;
    Ok(Json(patient))
}

/// `DELETE /patients/:id`
pub async fn deactivate(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.with_db(|db| PatientService::new(db).deactivate(&caller.principal, &id))?;
    Ok(StatusCode::NO_CONTENT)
}
