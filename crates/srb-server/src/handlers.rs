//! HTTP request handlers
//!
//! Axum handlers for the SRB record API. Store failures are mapped to
//! statuses by [`ApiError`].

use crate::api::{ApiError, EscalationRequest, EscalationResponse, HealthResponse};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use srb_model::{
    IsoSection, NewSrbRecord, RecordId, SafetyPlanId, SrbRecord, SrbRecordPatch, ISO_REFERENCE,
};
use srb_store::{ListQuery, Page, StoreError, StoreErrorKind};
use srb_workflow::{escalation_details, LaunchRefusal};

type ApiResult<T> = Result<(StatusCode, Json<T>), ApiError>;

fn ok<T>(value: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(value)))
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> ApiResult<HealthResponse> {
    let records = state.store.list(&ListQuery::all().with_page(0, 0)).await?.total;
    ok(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        records,
    })
}

/// List records, newest first
pub async fn list_records(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Page<SrbRecord>> {
    let Query(mut query) = query.map_err(|e| ApiError::invalid(e.body_text()))?;
    let limit = query.limit.unwrap_or(state.page_size);
    if limit > state.max_page_size {
        return Err(ApiError::invalid(format!(
            "limit {limit} exceeds the maximum page size {}",
            state.max_page_size
        )));
    }
    query.limit = Some(limit);
    ok(state.store.list(&query).await?)
}

/// Get a record by id
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<SrbRecord> {
    let id = RecordId(id);
    match state.store.get(id).await? {
        Some(record) => ok(record),
        None => Err(StoreError::NotFound(id).into()),
    }
}

/// Most recent record for a safety plan
pub async fn get_by_safety_plan(
    State(state): State<AppState>,
    Path(plan): Path<u64>,
) -> ApiResult<SrbRecord> {
    let plan = SafetyPlanId(plan);
    match state.store.find_by_safety_plan(plan).await? {
        Some(record) => ok(record),
        None => Err(ApiError::new(
            StoreErrorKind::NotFound,
            format!("no SRB record for safety plan {plan}"),
        )),
    }
}

/// Create a record
pub async fn create_record(
    State(state): State<AppState>,
    payload: Result<Json<NewSrbRecord>, JsonRejection>,
) -> ApiResult<SrbRecord> {
    let Json(new) = payload.map_err(|e| ApiError::invalid(e.body_text()))?;
    let record = state.store.create(new).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Merge a patch into a record
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<SrbRecordPatch>, JsonRejection>,
) -> ApiResult<SrbRecord> {
    let Json(patch) = payload.map_err(|e| ApiError::invalid(e.body_text()))?;
    ok(state.store.update(RecordId(id), patch).await?)
}

/// Re-validate and complete a record
pub async fn complete_record(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<SrbRecord> {
    ok(state.store.complete(RecordId(id)).await?)
}

/// Delete a record
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let id = RecordId(id);
    if state.store.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StoreError::NotFound(id).into())
    }
}

/// Which hazards of a plan would go to the board
pub async fn preview_escalation(
    State(state): State<AppState>,
    payload: Result<Json<EscalationRequest>, JsonRejection>,
) -> ApiResult<EscalationResponse> {
    let Json(request) = payload.map_err(|e| ApiError::invalid(e.body_text()))?;
    let escalated_hazards = escalation_details(&request.hazards, &request.assessments, &state.policy);
    let launchable = !escalated_hazards.is_empty();
    ok(EscalationResponse {
        escalated_hazards,
        launchable,
        message: (!launchable).then(|| LaunchRefusal::NoHighRiskHazards.to_string()),
    })
}

/// ISO documentation reference (L1–L5)
pub async fn iso_reference() -> Json<&'static [IsoSection]> {
    Json(&ISO_REFERENCE)
}
