//! Liveness routes for the hosting platform's health probe.
//!
//! Both routes answer `200 OK` unconditionally; they say the process is up,
//! not that the orchestrator is healthy.

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::{request_id, RequestId};

pub fn build_app() -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_id)),
        )
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    tracing::trace!(request_id = %req_id.0, "health check");
    (StatusCode::OK, "OK")
}
