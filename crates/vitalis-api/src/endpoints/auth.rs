//! Account registration, login and logout.
//!
//! Password hashing and verification run on the blocking pool through
//! [`ApiContext::with_hasher`]; the database lock is only taken for the
//! lookups and writes around them.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use validator::Validate;
use vitalis_core::models::{Credentials, NewAccount};
use vitalis_core::services::{require_admin, verify_password};
use vitalis_core::{AuthToken, ServiceError, User};

use crate::error::ApiError;
use crate::types::{ApiContext, CallerContext};

/// `POST /auth/register`
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(account): Json<NewAccount>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    account.validate().map_err(ServiceError::from)?;
    let password = account.password.clone();
    let password_hash = ctx.with_hasher(move |h| Ok(h.hash(&password))).await?;

    let user = ctx.with_auth(|auth| auth.register_hashed(account, password_hash))?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /auth/clinic-accounts`: administrators open the account a clinic
/// acts through.
pub async fn create_clinic_account(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Json(account): Json<NewAccount>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    require_admin(&caller.principal)?;
    account.validate().map_err(ServiceError::from)?;
    let password = account.password.clone();
    let password_hash = ctx.with_hasher(move |h| Ok(h.hash(&password))).await?;

    let user = ctx.with_auth(|auth| {
        auth.create_clinic_account_hashed(&caller.principal, account, password_hash)
    })?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /auth/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthToken>, ApiError> {
    let user = ctx.with_auth(|auth| auth.login_candidate(&credentials))?;
    let user = ctx
        .with_hasher(move |h| verify_password(h, &credentials, &user).map(|()| user))
        .await?;

    let token = ctx.with_auth(|auth| auth.open_session(&user))?;
    Ok(Json(token))
}

/// `POST /auth/logout`: drops the session behind the presented token.
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<StatusCode, ApiError> {
    ctx.with_auth(|auth| auth.logout(&caller.token))?;
    Ok(StatusCode::NO_CONTENT)
}
