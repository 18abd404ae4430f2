//! HTTP router.
//!
//! Middleware stack of protected routes (outermost → innermost):
//! 1. Extension(ApiContext) → 2. Auth validator → 3. Audit logger
//!
//! Public and protected routers are merged; a path may carry public and
//! protected methods side by side (`GET /clinics` vs `POST /clinics`).

use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::endpoints;
use crate::middleware;
use crate::types::ApiContext;

/// Build the full API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route(
            "/auth/clinic-accounts",
            post(endpoints::auth::create_clinic_account),
        )
        .route("/admin/seed", post(endpoints::admin::seed))
        .route("/clinics", post(endpoints::clinics::create))
        .route(
            "/clinics/:id",
            put(endpoints::clinics::update).delete(endpoints::clinics::deactivate),
        )
        .route("/patients", get(endpoints::patients::list))
        .route(
            "/patients/:id",
            get(endpoints::patients::get)
                .put(endpoints::patients::update)
                .delete(endpoints::patients::deactivate),
        )
        .route("/procedures", post(endpoints::procedures::create))
        .route(
            "/appointments",
            post(endpoints::appointments::book).get(endpoints::appointments::list),
        )
        .route("/appointments/:id", get(endpoints::appointments::get))
        .route(
            "/appointments/:id/status",
            patch(endpoints::appointments::update_status),
        )
        .route("/appointments/:id/cancel", post(endpoints::appointments::cancel))
        .route(
            "/appointments/:id/procedures",
            put(endpoints::appointments::replace_procedures),
        )
        .route(
            "/appointments/:id/record",
            post(endpoints::appointments::add_record).get(endpoints::appointments::get_record),
        )
        .route("/ratings", post(endpoints::ratings::rate))
        .route(
            "/requisitions",
            post(endpoints::requisitions::create).get(endpoints::requisitions::list),
        )
        .route(
            "/requisitions/:id",
            get(endpoints::requisitions::get)
                .put(endpoints::requisitions::update)
                .delete(endpoints::requisitions::delete),
        )
        .route(
            "/requisitions/:id/status",
            patch(endpoints::requisitions::update_status),
        )
        .route(
            "/requisitions/status/:status",
            get(endpoints::requisitions::by_status),
        )
        .route(
            "/requisitions/priority/:priority",
            get(endpoints::requisitions::by_priority),
        )
        .route("/reports/revenue", get(endpoints::reports::revenue))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/clinics", get(endpoints::clinics::list))
        .route("/clinics/:id", get(endpoints::clinics::get))
        .route("/clinics/:id/procedures", get(endpoints::clinics::procedures))
        .route("/patients", post(endpoints::patients::register))
        .route("/procedures/:id", get(endpoints::procedures::get))
        .with_state(ctx.clone())
        .layer(axum::Extension(ctx));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use vitalis_core::{Database, Pbkdf2Hasher, RandomTokenIssuer};

    fn test_router() -> Router {
        let db = Database::open_in_memory().unwrap();
        let ctx = ApiContext::new(
            db,
            Arc::new(Pbkdf2Hasher::with_iterations(1_000)),
            Arc::new(RandomTokenIssuer),
        );
        build_router(ctx)
    }

    fn make_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = test_router()
            .oneshot(make_request("GET", "/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["clinics"], 0);
    }

    #[tokio::test]
    async fn clinic_listing_is_public() {
        let response = test_router()
            .oneshot(make_request("GET", "/clinics", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn protected_route_requires_token() {
        let response = test_router()
            .oneshot(make_request("GET", "/appointments", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn unknown_token_rejected() {
        let response = test_router()
            .oneshot(make_request("GET", "/patients", Some("not-a-session")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_method_on_public_path_requires_token() {
        let response = test_router()
            .oneshot(make_request("POST", "/clinics", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_routes_require_token() {
        for uri in ["/admin/seed", "/auth/clinic-accounts"] {
            let response = test_router()
                .oneshot(make_request("POST", uri, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn missing_clinic_is_404() {
        let response = test_router()
            .oneshot(make_request("GET", "/clinics/nope", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "NOT_FOUND");
    }
}
