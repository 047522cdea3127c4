//! REST API tests against a live server on an ephemeral port.
//!
//! Guarantees exercised here:
//! - every route answers with the documented status and `{error, kind}` body
//! - completion is re-validated server-side and refused with 400
//! - a workflow session runs unchanged over [`HttpRecordStore`], with
//!   completion rejections keeping their class across the wire

use chrono::Utc;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};
use srb_model::{AckKey, RecordId, RecordStatus, RiskPolicy, SafetyPlanId, SignatoryRole, SrbRecord,
    SrbRecordPatch};
use srb_server::{router, AppState, ServerConfig, REQUEST_ID_HEADER};
use srb_store::{
    HttpRecordStore, InMemoryRecordStore, ListQuery, RecordStore, StoreError, StoreErrorKind,
};
use srb_test_utils::{lowered, mixed_hazards, new_record, rating, signed_signatories, FALL_HAZARD};
use srb_workflow::{FieldUpdate, LaunchContext, LaunchOutcome, Step, WorkflowError, WorkflowSession};
use std::sync::Arc;
use tokio::net::TcpListener;

async fn spawn_with(config: ServerConfig) -> String {
    let store = Arc::new(InMemoryRecordStore::with_policy(config.policy));
    let state = AppState::new(store, &config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn() -> String {
    spawn_with(ServerConfig::new()).await
}

async fn error_body(response: reqwest::Response) -> (StatusCode, Value) {
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn health_reports_record_count() {
    let base = spawn().await;
    let store = HttpRecordStore::new(&base);
    store.create(new_record(1)).await.unwrap();

    let response = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["records"], 1);
}

#[tokio::test]
async fn record_crud_over_http() {
    let base = spawn().await;
    let store = HttpRecordStore::new(&base);

    let created = store.create(new_record(5)).await.unwrap();
    assert_eq!(created.id, RecordId(1));
    assert_eq!(created.code(), "SRB-001");

    let fetched = store.get(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);
    assert!(store.get(RecordId(99)).await.unwrap().is_none());

    let by_plan = store.find_by_safety_plan(SafetyPlanId(5)).await.unwrap();
    assert_eq!(by_plan.map(|r| r.id), Some(created.id));
    assert!(store.find_by_safety_plan(SafetyPlanId(6)).await.unwrap().is_none());

    let updated = store
        .update(
            created.id,
            SrbRecordPatch {
                team_members: Some(vec!["Lead".into(), "Eng".into()]),
                expected_version: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.version, 2);

    assert!(store.delete(created.id).await.unwrap());
    assert!(!store.delete(created.id).await.unwrap());
}

#[tokio::test]
async fn create_status_codes() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    let url = format!("{base}/api/srb-records");

    let response = client.post(&url).json(&new_record(3)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let (status, body) = error_body(client.post(&url).json(&new_record(3)).send().await.unwrap()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");

    let mut no_hazards = serde_json::to_value(new_record(4)).unwrap();
    no_hazards["escalatedHazards"] = json!([]);
    no_hazards["reassessments"] = json!([]);
    let (status, body) = error_body(client.post(&url).json(&no_hazards).send().await.unwrap()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "invalid");

    let mut bad_rating = serde_json::to_value(new_record(4)).unwrap();
    bad_rating["reassessments"][0]["newSeverity"] = json!(7);
    let (status, body) = error_body(client.post(&url).json(&bad_rating).send().await.unwrap()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn patch_cannot_complete() {
    let base = spawn().await;
    let store = HttpRecordStore::new(&base);
    let record = store.create(new_record(1)).await.unwrap();

    let err = store
        .update(
            record.id,
            SrbRecordPatch {
                status: Some(RecordStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::Invalid);

    let err = store
        .update(
            record.id,
            SrbRecordPatch {
                expected_version: Some(9),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::Conflict);
}

#[tokio::test]
async fn complete_is_validated_server_side() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    let store = HttpRecordStore::new(&base);
    let record = store.create(new_record(1)).await.unwrap();
    let complete_url = format!("{base}/api/srb-records/{}/complete", record.id);

    let (status, body) = error_body(client.post(&complete_url).send().await.unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "completion_rejected");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("All three mandatory signatures are required"));

    let mut reassessments = record.reassessments.clone();
    reassessments[0] = lowered(reassessments[0].clone());
    store
        .update(
            record.id,
            SrbRecordPatch {
                reassessments: Some(reassessments),
                signatories: Some(signed_signatories()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let response = client.post(&complete_url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let done: SrbRecord = response.json().await.unwrap();
    assert_eq!(done.status, RecordStatus::Completed);

    let (status, body) = error_body(client.post(&complete_url).send().await.unwrap()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "invalid");
    assert_eq!(store.get(record.id).await.unwrap().unwrap(), done);

    let (status, _) = error_body(
        client
            .post(format!("{base}/api/srb-records/42/complete"))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_filters_and_limits() {
    let base = spawn_with(ServerConfig::new().with_page_size(2, 3)).await;
    let store = HttpRecordStore::new(&base);
    for plan in 1..=4 {
        store.create(new_record(plan)).await.unwrap();
    }

    let page = store.list(&ListQuery::all()).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 4);
    assert_eq!(page.items[0].id, RecordId(4));

    let page = store
        .list(&ListQuery::all().with_safety_plan(SafetyPlanId(2)))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].safety_plan_id, SafetyPlanId(2));

    let page = store
        .list(&ListQuery::all().with_status(RecordStatus::Completed))
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    let err = store
        .list(&ListQuery::all().with_page(0, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Remote { kind: StoreErrorKind::Invalid, .. }));
}

#[tokio::test]
async fn escalation_preview_and_iso_reference() {
    let base = spawn().await;
    let client = reqwest::Client::new();
    let (hazards, assessments) = mixed_hazards();

    let body: Value = client
        .post(format!("{base}/api/srb/escalations"))
        .json(&json!({ "hazards": hazards, "assessments": assessments }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["launchable"], true);
    assert_eq!(body["escalatedHazards"][0]["name"], "Fall Hazard");
    assert_eq!(body["escalatedHazards"][0]["riskScore"], 12);
    assert_eq!(body["escalatedHazards"][0]["band"], "EXTREME");

    let body: Value = client
        .post(format!("{base}/api/srb/escalations"))
        .json(&json!({ "hazards": ["Minor Trip"], "assessments": {"Minor Trip": {"severity": 1, "likelihood": 2}} }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["launchable"], false);
    assert_eq!(body["message"], "no high-risk hazards found");

    let iso: Value = reqwest::get(format!("{base}/api/srb/iso-reference"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(iso.as_array().map(Vec::len), Some(5));
    assert_eq!(iso[0]["key"], "L1");
}

fn context(plan: u64) -> LaunchContext {
    let (hazards, assessments) = mixed_hazards();
    LaunchContext {
        safety_plan_id: SafetyPlanId(plan),
        task_name: "Roof access".into(),
        lead_name: "Dana Lead".into(),
        engineers: vec!["Sam Eng".into()],
        hazards,
        assessments,
    }
}

async fn run_review(session: &mut WorkflowSession) {
    let steps: Vec<Vec<FieldUpdate>> = vec![
        vec![
            FieldUpdate::ReasonForEscalation("Initial score 12".into()),
            FieldUpdate::ProcedureOrCondition("Roof work".into()),
            FieldUpdate::ServiceOrderNumber("SO-77".into()),
        ],
        Vec::new(),
        lowered_updates(),
        AckKey::ALL
            .into_iter()
            .map(|key| FieldUpdate::Acknowledge { key, value: true })
            .collect(),
    ];
    for updates in steps {
        for change in updates {
            session.update(change).unwrap();
        }
        session.advance().await.unwrap();
    }
    assert_eq!(session.step(), Step::Signatures);
    for role in SignatoryRole::ALL {
        session
            .update(FieldUpdate::SignatoryName {
                role,
                name: format!("{role} signer"),
            })
            .unwrap();
        session
            .update(FieldUpdate::Sign {
                role,
                signature_data: "data:image/png;base64,AAAA".into(),
                signed_at: Utc::now(),
            })
            .unwrap();
    }
}

fn lowered_updates() -> Vec<FieldUpdate> {
    let hazard = || FALL_HAZARD.to_string();
    vec![
        FieldUpdate::NewSeverity {
            hazard: hazard(),
            rating: rating(1),
        },
        FieldUpdate::NewLikelihood {
            hazard: hazard(),
            rating: rating(3),
        },
        FieldUpdate::AdditionalSafetyMeasures {
            hazard: hazard(),
            text: "Guard rails".into(),
        },
        FieldUpdate::MitigationPlan {
            hazard: hazard(),
            text: "Spotter on duty".into(),
        },
    ]
}

#[tokio::test]
async fn workflow_session_over_http() {
    let base = spawn().await;
    let store = Arc::new(HttpRecordStore::new(&base));

    let outcome = WorkflowSession::launch(store.clone(), RiskPolicy::default(), context(21))
        .await
        .unwrap();
    let mut session = outcome.into_session().unwrap();
    run_review(&mut session).await;
    let done = session.complete().await.unwrap();
    assert_eq!(done.status, RecordStatus::Completed);
    assert_eq!(done.service_order_number, "SO-77");

    let stored = store.get(done.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RecordStatus::Completed);
    assert!(stored.signatories.iter().all(|s| s.signed_at.is_some()));

    // a completed plan starts fresh
    let outcome = WorkflowSession::launch(store, RiskPolicy::default(), context(21))
        .await
        .unwrap();
    assert!(matches!(outcome, LaunchOutcome::Ready { .. }));
}

#[tokio::test]
async fn remote_completion_rejection_is_distinct() {
    let strict = RiskPolicy::default().with_low_risk_ceiling(2);
    let base = spawn_with(ServerConfig::new().with_policy(strict)).await;
    let store = Arc::new(HttpRecordStore::new(&base));

    let mut session = WorkflowSession::launch(store, RiskPolicy::default(), context(22))
        .await
        .unwrap()
        .into_session()
        .unwrap();
    run_review(&mut session).await;

    // 1×3 is LOW for the session but not for the server
    let err = session.complete().await.unwrap_err();
    assert!(matches!(err, WorkflowError::CompletionRejected(_)), "{err}");
    assert!(!session.is_closed());
}

#[tokio::test]
async fn unreachable_server_is_retryable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpRecordStore::new(format!("http://{addr}"));
    let err = store.get(RecordId(1)).await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn snapshot_config_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::new().with_snapshot_path(dir.path().join("srb.json"));

    let state = AppState::from_config(&config).await.unwrap();
    let record = state.store.create(new_record(8)).await.unwrap();
    drop(state);

    let reopened = AppState::from_config(&config).await.unwrap();
    let restored = reopened.store.get(record.id).await.unwrap().unwrap();
    assert_eq!(restored, record);
}
