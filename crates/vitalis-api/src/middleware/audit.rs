//! Access logging middleware.
//!
//! Logs every protected request with method, path, response status and the
//! calling user. Runs innermost, after auth has injected `CallerContext`.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::types::CallerContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let caller = req
        .extensions()
        .get::<CallerContext>()
        .map(|c| (c.principal.user_id.clone(), c.principal.role));

    let response = next.run(req).await;
    let status = response.status().as_u16();

    match caller {
        Some((user_id, role)) => {
            tracing::info!(target: "vitalis_api::audit", %method, %path, status, %user_id, %role, "access")
        }
        None => tracing::info!(target: "vitalis_api::audit", %method, %path, status, "access"),
    }

    response
}
