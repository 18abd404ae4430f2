//! Requisition endpoints. Every route is restricted to administrators by
//! the service layer.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use vitalis_core::models::RequisitionInput;
use vitalis_core::services::RequisitionService;
use vitalis_core::{Requisition, RequisitionPriority, RequisitionStatus};

use crate::error::ApiError;
use crate::types::{ApiContext, CallerContext};

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: RequisitionStatus,
}

/// `POST /requisitions`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Json(input): Json<RequisitionInput>,
) -> Result<(StatusCode, Json<Requisition>), ApiError> {
    let requisition =
        ctx.with_db(|db| RequisitionService::new(db).create(&caller.principal, input))?;
    Ok((StatusCode::CREATED, Json(requisition)))
}

/// `GET /requisitions`: newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<Vec<Requisition>>, ApiError> {
    Ok(Json(ctx.with_db(|db| RequisitionService::new(db).list(&caller.principal))?))
}

/// `GET /requisitions/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Json<Requisition>, ApiError> {
    Ok(Json(ctx.with_db(|db| RequisitionService::new(db).get(&caller.principal, &id))?))
}

/// `GET /requisitions/status/:status`
pub async fn by_status(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(status): Path<RequisitionStatus>,
) -> Result<Json<Vec<Requisition>>, ApiError> {
    let requisitions =
        ctx.with_db(|db| RequisitionService::new(db).list_by_status(&caller.principal, status))?;
    Ok(Json(requisitions))
}

/// `GET /requisitions/priority/:priority`
pub async fn by_priority(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(priority): Path<RequisitionPriority>,
) -> Result<Json<Vec<Requisition>>, ApiError> {
    let requisitions = ctx
        .with_db(|db| RequisitionService::new(db).list_by_priority(&caller.principal, priority))?;
    Ok(Json(requisitions))
}

/// `PUT /requisitions/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(input): Json<RequisitionInput>,
) -> Result<Json<Requisition>, ApiError> {
    let requisition =
        ctx.with_db(|db| RequisitionService::new(db).update(&caller.principal, &id, input))?;
    Ok(Json(requisition))
}

/// `PATCH /requisitions/:id/status?status=`
pub async fn update_status(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Requisition>, ApiError> {
    let requisition = ctx.with_db(|db| {
        RequisitionService::new(db).update_status(&caller.principal, &id, query.status)
    })?;
    Ok(Json(requisition))
}

/// `DELETE /requisitions/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.with_db(|db| RequisitionService::new(db).delete(&caller.principal, &id))?;
    Ok(StatusCode::NO_CONTENT)
}
