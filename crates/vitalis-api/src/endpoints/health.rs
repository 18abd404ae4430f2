//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::types::ApiContext;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub clinics: i64,
    pub version: &'static str,
}

/// `GET /health`: liveness plus a database round trip.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let clinics = ctx.with_db(|db| Ok(db.count_clinics()?))?;

    Ok(Json(HealthResponse {
        status: "ok",
        clinics,
        version: env!("CARGO_PKG_VERSION"),
    }))
}
