//! Reporting endpoints.

use axum::extract::{Query, State};
use axum::{Extension, Json};
use chrono::NaiveDateTime;
use serde::Deserialize;
use vitalis_core::services::ReportService;
use vitalis_core::RevenueReport;

use crate::error::ApiError;
use crate::types::{ApiContext, CallerContext};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueQuery {
    pub clinic_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// `GET /reports/revenue?clinicId=&start=&end=`
pub async fn revenue(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<RevenueQuery>,
) -> Result<Json<RevenueReport>, ApiError> {
    let report = ctx.with_db(|db| {
        ReportService::new(db).revenue(&caller.principal, &query.clinic_id, query.start, query.end)
    })?;
    Ok(Json(report))
}
