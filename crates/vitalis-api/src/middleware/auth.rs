//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, resolves it to a
//! [`Principal`](vitalis_core::Principal) through the auth service and
//! injects a [`CallerContext`] into request extensions.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::types::{ApiContext, CallerContext};

/// Require a valid, unexpired session token.
///
/// Accesses `ApiContext` from request extensions (injected by the
/// Extension layer).
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = bearer_token(&req)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?
        .to_string();

    let principal = ctx.with_auth(|auth| auth.authenticate(&token))?;

    req.extensions_mut().insert(CallerContext { principal, token });
    Ok(next.run(req).await)
}

fn bearer_token<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(header: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().uri("/appointments");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&request(Some("Bearer abc123"))), Some("abc123"));
    }

    #[test]
    fn rejects_other_schemes_and_blank_tokens() {
        assert_eq!(bearer_token(&request(None)), None);
        assert_eq!(bearer_token(&request(Some("Basic dXNlcjpwdw=="))), None);
        assert_eq!(bearer_token(&request(Some("Bearer   "))), None);
    }
}
