//! Procedure catalog endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use vitalis_core::models::ProcedureInput;
use vitalis_core::services::ProcedureService;
use vitalis_core::{Procedure, ProcedureListing};

use crate::error::ApiError;
use crate::types::{ApiContext, CallerContext};

/// `POST /procedures`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Json(input): Json<ProcedureInput>,
) -> Result<(StatusCode, Json<Procedure>), ApiError> {
    let procedure =
        ctx.with_db(|db| ProcedureService::new(db).create(&caller.principal, input))?;
    Ok((StatusCode::CREATED, Json(procedure)))
}

/// `GET /procedures/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<ProcedureListing>, ApiError> {
    Ok(Json(ctx.with_db(|db| ProcedureService::new(db).get(&id))?))
}
