//! Router assembly

use crate::handlers;
use crate::state::AppState;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the per-request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the SRB API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health_check))
        .route(
            "/api/srb-records",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route(
            "/api/srb-records/safety-plan/:safety_plan_id",
            get(handlers::get_by_safety_plan),
        )
        .route(
            "/api/srb-records/:id",
            get(handlers::get_record)
                .patch(handlers::update_record)
                .delete(handlers::delete_record),
        )
        .route("/api/srb-records/:id/complete", post(handlers::complete_record))
        .route("/api/srb/escalations", post(handlers::preview_escalation))
        .route("/api/srb/iso-reference", get(handlers::iso_reference))
        .layer(middleware::from_fn(request_span))
        .with_state(state)
}

/// Tag each request with an id, in its span and in the response
async fn request_span(request: Request, next: Next) -> Response {
    let id = Uuid::new_v4();
    let span = tracing::info_span!(
        "request",
        %id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    let mut response = next.run(request).instrument(span.clone()).await;
    span.in_scope(|| tracing::debug!(status = response.status().as_u16(), "handled"));
    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
