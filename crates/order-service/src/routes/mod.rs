//! HTTP route handlers for the order service.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                        - Health check
//! GET   /health/ready                  - Readiness (store reachable)
//!
//! # Orders
//! POST  /functions/create-order        - Create an order and its lines
//! GET   /orders?user_id=               - A customer's orders
//! GET   /orders/{id}                   - One order with its lines
//!
//! # Admin
//! GET   /admin/orders?status=&q=       - All orders, filtered and searched
//! PATCH /admin/orders/{id}/status      - Change an order's status
//! GET   /admin/orders/changes          - Order changes (Server-Sent Events)
//! ```

pub mod admin;
pub mod orders;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderName, Method, StatusCode, header},
    routing::{get, patch, post},
};
use serde::de::DeserializeOwned;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/functions/create-order", post(orders::create))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(admin::index))
        .route("/orders/changes", get(admin::changes))
        .route("/orders/{id}/status", patch(admin::update_status))
}

/// Build the full application router.
///
/// Sentry layers are added by the binary so tests can drive the router
/// directly.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(order_routes())
        .nest("/admin", admin_routes())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for browser callers of the order endpoint.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Parse a JSON request body, reporting failures in the service's error
/// envelope rather than as a plain-text rejection.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest("Request body is empty".to_string()));
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected unparseable request body");
        AppError::BadRequest("Invalid JSON in request".to_string())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use axum::response::Response;
    use tower::ServiceExt;

    use super::*;
    use crate::config::OrderServiceConfig;
    use crate::db::MemoryOrderStore;

    /// Router over a fresh in-memory store.
    pub(crate) fn test_app() -> (Router, AppState, Arc<MemoryOrderStore>) {
        let store = Arc::new(MemoryOrderStore::new());
        let config = OrderServiceConfig::local("postgres://unused");
        let state = AppState::new(&config, store.clone());
        (app(state.clone()), state, store)
    }

    pub(crate) async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response: Response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    pub(crate) fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _, _) = test_app();
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_reports_unreachable_store() {
        let (app, _, store) = test_app();

        let request = Request::get("/health/ready").body(Body::empty()).unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);

        store.fail_writes(true);
        let request = Request::get("/health/ready").body(Body::empty()).unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_client_headers() {
        let (app, _, _) = test_app();
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/functions/create-order")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "apikey,x-client-info")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let allowed = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(allowed.contains("apikey"));
        assert!(allowed.contains("x-client-info"));
    }

    #[test]
    fn test_parse_json_body_messages() {
        let err = parse_json_body::<serde_json::Value>(&Bytes::from_static(b"  \n")).unwrap_err();
        assert_eq!(err.to_string(), "Request body is empty");

        let err = parse_json_body::<serde_json::Value>(&Bytes::from_static(b"{oops")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON in request");
    }
}
