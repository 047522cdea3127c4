//! Wire types and error mapping for the REST API

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use srb_model::AssessmentMap;
use srb_store::{ErrorBody, StoreError, StoreErrorKind};
use srb_workflow::EscalatedHazard;

/// Error response: `{ "error": ..., "kind": ... }` with a matching status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// Create new error of a kind
    #[must_use]
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: status_for(kind),
            body: ErrorBody {
                error: message.into(),
                kind,
            },
        }
    }

    /// Malformed request payload
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Invalid, message)
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// HTTP status for a failure class
#[must_use]
pub fn status_for(kind: StoreErrorKind) -> StatusCode {
    match kind {
        StoreErrorKind::NotFound => StatusCode::NOT_FOUND,
        StoreErrorKind::Conflict => StatusCode::CONFLICT,
        StoreErrorKind::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
        StoreErrorKind::CompletionRejected => StatusCode::BAD_REQUEST,
        StoreErrorKind::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let body = ErrorBody::from(&err);
        if body.kind == StoreErrorKind::Unavailable {
            tracing::error!(error = %err, "record store failure");
        } else {
            tracing::debug!(error = %err, kind = ?body.kind, "request rejected");
        }
        Self {
            status: status_for(body.kind),
            body,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub records: usize,
}

/// Escalation preview request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationRequest {
    /// Every hazard of the plan, in authoring order
    pub hazards: Vec<String>,
    pub assessments: AssessmentMap,
}

/// Escalation preview response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationResponse {
    pub escalated_hazards: Vec<EscalatedHazard>,
    /// Whether an SRB can be launched
    pub launchable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
