//! Administrative maintenance endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use vitalis_core::seed::{seed_demo_catalog_with, DemoPasswords, SeedSummary};
use vitalis_core::services::require_admin;

use crate::error::ApiError;
use crate::types::{ApiContext, CallerContext};

/// `POST /admin/seed`: load the demo catalog into an empty database.
pub async fn seed(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<SeedSummary>, ApiError> {
    require_admin(&caller.principal)?;
    let passwords = ctx.with_hasher(|h| Ok(DemoPasswords::hash(h))).await?;

    let summary = ctx.with_db(|db| Ok(seed_demo_catalog_with(db, &passwords)?))?;
    tracing::info!(user_id = %caller.principal.user_id, ?summary, "Demo catalog requested");
    Ok(Json(summary))
}
