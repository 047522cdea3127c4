//! Helpers shared by the workflow integration tests

#![allow(dead_code)]

use chrono::Utc;
use srb_model::{AckKey, SafetyPlanId, SignatoryRole};
use srb_test_utils::{mixed_hazards, rating, FALL_HAZARD};
use srb_workflow::{FieldUpdate, LaunchContext, SrbForm, WorkflowState};

/// Plan with Fall Hazard (4×3) and Minor Trip (1×2)
pub fn fall_context(plan: u64) -> LaunchContext {
    let (hazards, assessments) = mixed_hazards();
    LaunchContext {
        safety_plan_id: SafetyPlanId(plan),
        task_name: "Roof access".to_string(),
        lead_name: "Dana Lead".to_string(),
        engineers: vec!["Sam Eng".to_string()],
        hazards,
        assessments,
    }
}

pub fn pre_question_answers() -> Vec<FieldUpdate> {
    vec![
        FieldUpdate::ReasonForEscalation("Initial score 12 (EXTREME)".into()),
        FieldUpdate::ProcedureOrCondition("Work at height on fab roof".into()),
        FieldUpdate::ServiceOrderNumber("SO-20931".into()),
    ]
}

/// Bring the Fall Hazard reassessment to 1×2 with both texts
pub fn lowered_fall_hazard() -> Vec<FieldUpdate> {
    vec![
        FieldUpdate::NewSeverity {
            hazard: FALL_HAZARD.into(),
            rating: rating(1),
        },
        FieldUpdate::NewLikelihood {
            hazard: FALL_HAZARD.into(),
            rating: rating(2),
        },
        FieldUpdate::AdditionalSafetyMeasures {
            hazard: FALL_HAZARD.into(),
            text: "Guard rails installed".into(),
        },
        FieldUpdate::MitigationPlan {
            hazard: FALL_HAZARD.into(),
            text: "Two-person rule with daily inspection".into(),
        },
    ]
}

pub fn all_acknowledgements() -> Vec<FieldUpdate> {
    AckKey::ALL
        .into_iter()
        .map(|key| FieldUpdate::Acknowledge { key, value: true })
        .collect()
}

pub fn signature(role: SignatoryRole) -> Vec<FieldUpdate> {
    vec![
        FieldUpdate::SignatoryName {
            role,
            name: format!("{} signer", role.title()),
        },
        FieldUpdate::Sign {
            role,
            signature_data: "data:image/png;base64,AAAA".into(),
            signed_at: Utc::now(),
        },
    ]
}

pub fn all_signatures() -> Vec<FieldUpdate> {
    SignatoryRole::ALL.into_iter().flat_map(signature).collect()
}

/// Every field needed to pass all gates
pub fn everything() -> Vec<FieldUpdate> {
    let mut updates = pre_question_answers();
    updates.extend(lowered_fall_hazard());
    updates.extend(all_acknowledgements());
    updates.extend(all_signatures());
    updates
}

/// Pure state at step 1 with every gate satisfied
pub fn ready_state() -> WorkflowState {
    let ctx = fall_context(1);
    let escalated = ctx.escalated(&Default::default());
    everything()
        .into_iter()
        .fold(WorkflowState::new(SrbForm::seeded(&ctx, escalated)), |state, change| {
            state.update(change).unwrap()
        })
}
