//! Clinic endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use vitalis_core::models::ClinicInput;
use vitalis_core::services::{ClinicService, ProcedureService};
use vitalis_core::{Clinic, ProcedureListing};

use crate::error::ApiError;
use crate::types::{ApiContext, CallerContext};

#[derive(Debug, Deserialize)]
pub struct ClinicQuery {
    pub specialty: Option<String>,
}

/// `GET /clinics[?specialty=]`: active clinics.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ClinicQuery>,
) -> Result<Json<Vec<Clinic>>, ApiError> {
    let clinics = ctx.with_db(|db| ClinicService::new(db).list(query.specialty.as_deref()))?;
    Ok(Json(clinics))
}

/// `GET /clinics/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Clinic>, ApiError> {
    Ok(Json(ctx.with_db(|db| ClinicService::new(db).get(&id))?))
}

/// `GET /clinics/:id/procedures`
pub async fn procedures(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProcedureListing>>, ApiError> {
    let listings = ctx.with_db(|db| ProcedureService::new(db).list_for_clinic(&id))?;
    Ok(Json(listings))
}

/// `POST /clinics`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Json(input): Json<ClinicInput>,
) -> Result<(StatusCode, Json<Clinic>), ApiError> {
    let clinic = ctx.with_db(|db| ClinicService::new(db).create(&caller.principal, input))?;
    Ok((StatusCode::CREATED, Json(clinic)))
}

/// `PUT /clinics/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(input): Json<ClinicInput>,
) -> Result<Json<Clinic>, ApiError> {
    let clinic = ctx.with_db(|db| ClinicService::new(db).update(&caller.principal, &id, input))?;
    Ok(Json(clinic))
}

/// `DELETE /clinics/:id`: soft delete.
pub async fn deactivate(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.with_db(|db| ClinicService::new(db).deactivate(&caller.principal, &id))?;
    Ok(StatusCode::NO_CONTENT)
}
