//! Rating endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use vitalis_core::models::RatingInput;
use vitalis_core::services::RatingService;
use vitalis_core::Rating;

use crate::error::ApiError;
use crate::types::{ApiContext, CallerContext};

/// `POST /ratings`: rate a completed appointment and refresh the clinic's
/// average.
pub async fn rate(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Json(input): Json<RatingInput>,
) -> Result<(StatusCode, Json<Rating>), ApiError> {
    let rating = ctx.with_db(|db| RatingService::new(db).rate(&caller.principal, input))?;
    Ok((StatusCode::CREATED, Json(rating)))
}
