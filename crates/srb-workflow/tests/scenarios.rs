//! End-to-end scenarios for the SRB review against the in-memory store.
//!
//! Each scenario walks a session through the wizard the way a reviewer would:
//! - Fall Hazard (4×3) escalates and the review starts
//! - Minor Trip alone (1×2) is refused
//! - reassessment at 2×2 blocks step 3, 1×2 with plan text passes
//! - two of three signatures block completion
//! - relaunching for the same plan resumes the open record at step 1

mod common;

use common::*;
use pretty_assertions::assert_eq;
use srb_model::{RecordStatus, RiskPolicy, SafetyPlanId, SignatoryRole};
use srb_store::{InMemoryRecordStore, RecordStore};
use srb_test_utils::{minor_hazards, rating, FALL_HAZARD};
use srb_workflow::{
    ExitDecision, FieldUpdate, GateFailure, LaunchContext, LaunchKind, LaunchOutcome,
    LaunchRefusal, LaunchSlot, Step, WorkflowError, WorkflowSession,
};
use std::sync::Arc;

fn store() -> Arc<InMemoryRecordStore> {
    Arc::new(InMemoryRecordStore::new())
}

async fn start(store: Arc<InMemoryRecordStore>, ctx: LaunchContext) -> WorkflowSession {
    match WorkflowSession::launch(store, RiskPolicy::default(), ctx).await.unwrap() {
        LaunchOutcome::Ready { session, .. } => *session,
        LaunchOutcome::Refused(r) => panic!("launch refused: {r}"),
    }
}

fn apply(session: &mut WorkflowSession, updates: Vec<FieldUpdate>) {
    for change in updates {
        session.update(change).unwrap();
    }
}

/// Drive a fresh session to step 5 with everything but signatures
async fn to_signatures(session: &mut WorkflowSession) {
    apply(session, pre_question_answers());
    session.advance().await.unwrap();
    session.advance().await.unwrap();
    apply(session, lowered_fall_hazard());
    session.advance().await.unwrap();
    apply(session, all_acknowledgements());
    assert_eq!(session.advance().await.unwrap(), Step::Signatures);
}

/// Scenario A: a 4×3 hazard escalates and the review starts at step 1.
#[tokio::test]
async fn fall_hazard_escalates() {
    let outcome = WorkflowSession::launch(store(), RiskPolicy::default(), fall_context(1))
        .await
        .unwrap();
    let LaunchOutcome::Ready { session, kind } = outcome else {
        panic!("expected launch");
    };
    assert_eq!(kind, LaunchKind::Started);
    assert_eq!(session.step(), Step::PreQuestions);
    let form = session.state().form();
    assert_eq!(form.escalated_hazards, vec![FALL_HAZARD.to_string()]);
    assert_eq!(form.all_hazards.len(), 2);
    assert_eq!(form.team_members, vec!["Dana Lead".to_string(), "Sam Eng".to_string()]);
    assert!(session.state().record().is_none());
}

/// Scenario B: only low-risk hazards, launch refused and nothing stored.
#[tokio::test]
async fn minor_trip_is_refused() {
    let (hazards, assessments) = minor_hazards();
    let ctx = LaunchContext {
        hazards,
        assessments,
        ..fall_context(2)
    };
    let store = store();
    let outcome = WorkflowSession::launch(store.clone(), RiskPolicy::default(), ctx)
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        LaunchOutcome::Refused(LaunchRefusal::NoHighRiskHazards)
    ));
    assert_eq!(
        LaunchRefusal::NoHighRiskHazards.to_string(),
        "no high-risk hazards found"
    );
    assert!(store.is_empty());
}

/// Scenario C: a 2×2 reassessment (MEDIUM) blocks step 3.
#[tokio::test]
async fn medium_reassessment_blocks_step_three() {
    let mut session = start(store(), fall_context(3)).await;
    apply(&mut session, pre_question_answers());
    session.advance().await.unwrap();
    session.advance().await.unwrap();
    assert_eq!(session.step(), Step::Reassessment);

    apply(&mut session, lowered_fall_hazard());
    apply(
        &mut session,
        vec![
            FieldUpdate::NewSeverity {
                hazard: FALL_HAZARD.into(),
                rating: rating(2),
            },
            FieldUpdate::NewLikelihood {
                hazard: FALL_HAZARD.into(),
                rating: rating(2),
            },
        ],
    );
    let err = session.advance().await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Gate {
            step: Step::Reassessment,
            failure: GateFailure::RiskNotLow { ref hazards }
        } if hazards == &vec![FALL_HAZARD.to_string()]
    ));
    assert_eq!(session.step(), Step::Reassessment);
    assert!(!session.state().completed_steps().contains(&Step::Reassessment));
}

/// Scenario D: 1×2 with both plan texts advances to step 4.
#[tokio::test]
async fn low_reassessment_with_plan_advances() {
    let store = store();
    let mut session = start(store.clone(), fall_context(4)).await;
    apply(&mut session, pre_question_answers());
    session.advance().await.unwrap();
    session.advance().await.unwrap();
    apply(&mut session, lowered_fall_hazard());
    assert_eq!(session.advance().await.unwrap(), Step::Acknowledgements);

    let id = session.state().record().unwrap().id;
    let stored = store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status, RecordStatus::InProgress);
    assert_eq!(stored.reassessments[0].new_risk_score().get(), 2);
    assert_eq!(stored.service_order_number, "SO-20931");
}

/// A hazard named twice in the handoff is reviewed once and step 3 can pass.
#[tokio::test]
async fn repeated_hazard_is_reviewed_once() {
    let mut ctx = fall_context(6);
    ctx.hazards.push(FALL_HAZARD.to_string());
    let mut session = start(store(), ctx).await;
    assert_eq!(
        session.state().form().escalated_hazards,
        vec![FALL_HAZARD.to_string()]
    );
    assert_eq!(session.state().form().reassessments.len(), 1);

    apply(&mut session, pre_question_answers());
    session.advance().await.unwrap();
    session.advance().await.unwrap();
    apply(&mut session, lowered_fall_hazard());
    assert_eq!(session.advance().await.unwrap(), Step::Acknowledgements);
}

/// Missing plan text blocks step 3 even at LOW risk.
#[tokio::test]
async fn plan_text_required() {
    let mut session = start(store(), fall_context(5)).await;
    apply(&mut session, pre_question_answers());
    session.advance().await.unwrap();
    session.advance().await.unwrap();
    apply(&mut session, lowered_fall_hazard());
    session
        .update(FieldUpdate::MitigationPlan {
            hazard: FALL_HAZARD.into(),
            text: "   ".into(),
        })
        .unwrap();
    assert!(matches!(
        session.advance().await,
        Err(WorkflowError::Gate {
            failure: GateFailure::MissingMitigationPlan { .. },
            ..
        })
    ));
}

/// Scenario E: two of three signatures, completion refused, record stays open.
#[tokio::test]
async fn two_signatures_block_completion() {
    let store = store();
    let mut session = start(store.clone(), fall_context(6)).await;
    to_signatures(&mut session).await;
    apply(&mut session, signature(SignatoryRole::EhsSpecialist));
    apply(&mut session, signature(SignatoryRole::FabTeamLead));

    let err = session.complete().await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::CompletionBlocked(GateFailure::MissingSignatures { ref roles })
            if roles == &vec![SignatoryRole::CsManagement]
    ));
    assert!(err.to_string().contains("Ensure all risks are LOW and all signatures are present."));
    assert!(!session.is_closed());

    let id = session.state().record().unwrap().id;
    assert_eq!(
        store.get(id).await.unwrap().unwrap().status,
        RecordStatus::InProgress
    );

    apply(&mut session, signature(SignatoryRole::CsManagement));
    let done = session.complete().await.unwrap();
    assert_eq!(done.status, RecordStatus::Completed);
    assert!(session.is_closed());
    assert!(matches!(session.advance().await, Err(WorkflowError::Closed)));
}

/// The store's re-check is authoritative even when the local check passes.
#[tokio::test]
async fn store_rejection_is_distinct() {
    let store = Arc::new(InMemoryRecordStore::with_policy(
        RiskPolicy::default().with_low_risk_ceiling(1),
    ));
    let mut session = start(store.clone(), fall_context(7)).await;
    to_signatures(&mut session).await;
    apply(&mut session, all_signatures());

    let err = session.complete().await.unwrap_err();
    assert!(matches!(err, WorkflowError::CompletionRejected(_)), "{err}");
    assert!(err.to_string().contains("LOW"));
    assert!(!session.is_closed());

    let id = session.state().record().unwrap().id;
    assert_eq!(
        store.get(id).await.unwrap().unwrap().status,
        RecordStatus::InProgress
    );
}

/// Scenario F: relaunching resumes the open record at step 1.
#[tokio::test]
async fn relaunch_resumes_open_record() {
    let store = store();
    let mut session = start(store.clone(), fall_context(8)).await;
    apply(&mut session, pre_question_answers());
    session.advance().await.unwrap();
    session
        .update(FieldUpdate::AddTeamMember("Riley Observer".into()))
        .unwrap();
    session.advance().await.unwrap();
    let id = session.state().record().unwrap().id;
    assert_eq!(session.request_exit(), ExitDecision::Exit);
    session.exit(false).unwrap();

    let slot = LaunchSlot::new();
    slot.put(fall_context(8));
    let outcome = WorkflowSession::launch_from(&slot, store.clone(), RiskPolicy::default())
        .await
        .unwrap();
    assert!(slot.is_empty());
    let LaunchOutcome::Ready { session, kind } = outcome else {
        panic!("expected resume");
    };
    assert_eq!(kind, LaunchKind::Resumed(id));
    assert_eq!(session.step(), Step::PreQuestions);
    assert!(session.state().completed_steps().is_empty());
    let form = session.state().form();
    assert_eq!(form.pre_questions.service_order_number, "SO-20931");
    assert!(form.team_members.contains(&"Riley Observer".to_string()));
    assert_eq!(store.len(), 1);

    // the slot was consumed
    let again = WorkflowSession::launch_from(&slot, store, RiskPolicy::default()).await;
    assert!(matches!(again, Err(WorkflowError::NoLaunchContext)));
}

/// A completed record is not resumed; the plan gets a fresh review.
#[tokio::test]
async fn completed_record_is_not_resumed() {
    let store = store();
    let mut session = start(store.clone(), fall_context(9)).await;
    to_signatures(&mut session).await;
    apply(&mut session, all_signatures());
    session.complete().await.unwrap();

    let outcome = WorkflowSession::launch(store.clone(), RiskPolicy::default(), fall_context(9))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        LaunchOutcome::Ready {
            kind: LaunchKind::Started,
            ..
        }
    ));
    assert!(store
        .find_by_safety_plan(SafetyPlanId(9))
        .await
        .unwrap()
        .is_some_and(|r| r.status == RecordStatus::Completed));
}

/// Backward navigation skips gates and saves; forward jumps are refused.
#[tokio::test]
async fn navigation_and_exit() {
    let mut session = start(store(), fall_context(10)).await;
    apply(&mut session, pre_question_answers());
    session.advance().await.unwrap();
    session.advance().await.unwrap();
    assert_eq!(session.step(), Step::Reassessment);

    session.set_step(Step::PreQuestions).unwrap();
    session.set_step(Step::HazardsAndTeam).unwrap();
    assert!(matches!(
        session.set_step(Step::Acknowledgements),
        Err(WorkflowError::Navigation(_))
    ));

    session
        .update(FieldUpdate::ReasonForEscalation("edited".into()))
        .unwrap();
    assert_eq!(session.request_exit(), ExitDecision::ConfirmDiscard);
    assert!(matches!(session.exit(false), Err(WorkflowError::UnsavedChanges)));
    session.exit(true).unwrap();
    assert!(session.is_closed());
}

/// Advancing from step 6 only saves.
#[tokio::test]
async fn last_step_advance_only_saves() {
    let store = store();
    let mut session = start(store.clone(), fall_context(11)).await;
    to_signatures(&mut session).await;
    apply(&mut session, all_signatures());
    assert_eq!(session.advance().await.unwrap(), Step::IsoReference);

    let id = session.state().record().unwrap().id;
    let before = store.get(id).await.unwrap().unwrap().version;
    assert_eq!(session.advance().await.unwrap(), Step::IsoReference);
    assert_eq!(session.advance().await.unwrap(), Step::IsoReference);
    let after = store.get(id).await.unwrap().unwrap();
    assert_eq!(after.version, before + 2);
    assert_eq!(session.state().completed_steps().len(), 6);
}
