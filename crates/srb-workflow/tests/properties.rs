//! Property tests for the pure parts of the workflow.
//!
//! - escalation returns exactly the hazards above the threshold, in order,
//!   without touching its inputs
//! - the completed-step set never shrinks under any advance/back sequence
//! - advancing at the last step is idempotent
//! - completion is possible iff every reassessment is LOW and every role has
//!   signed, regardless of the order fields were filled in

mod common;

use common::*;
use proptest::prelude::*;
use srb_model::{
    AssessmentMap, CompletionValidator, HazardAssessment, Rating, RecordId, RiskPolicy,
    SignatoryRole, SrbRecord,
};
use srb_test_utils::{rating, FALL_HAZARD};
use srb_workflow::{can_complete, escalate, FieldUpdate, SavePlan, Step, WorkflowState};

fn ratings() -> impl Strategy<Value = (u8, u8)> {
    (1u8..=4, 1u8..=4)
}

#[derive(Debug, Clone)]
enum Op {
    Advance,
    Visit(u8),
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![Just(Op::Advance), (1u8..=6).prop_map(Op::Visit)],
        0..40,
    )
}

proptest! {
    #[test]
    fn escalation_selects_exactly_high_scores(
        entries in prop::collection::vec(ratings(), 0..12),
        with_unknown in any::<bool>(),
    ) {
        let mut hazards: Vec<String> = (0..entries.len()).map(|i| format!("H{i}")).collect();
        let assessments: AssessmentMap = entries
            .iter()
            .enumerate()
            .map(|(i, &(s, l))| {
                let a = HazardAssessment::new(Rating::new(s).unwrap(), Rating::new(l).unwrap(), "");
                (format!("H{i}"), a)
            })
            .collect();
        if with_unknown {
            hazards.insert(0, "Unassessed".to_string());
        }
        let hazards_before = hazards.clone();
        let assessments_before = assessments.clone();

        let escalated = escalate(&hazards, &assessments, &RiskPolicy::default());

        let expected: Vec<String> = entries
            .iter()
            .enumerate()
            .filter(|(_, r)| u16::from(r.0) * u16::from(r.1) > 5)
            .map(|(i, _)| format!("H{i}"))
            .collect();
        prop_assert_eq!(escalated, expected);
        prop_assert_eq!(hazards, hazards_before);
        prop_assert_eq!(assessments, assessments_before);
    }

    #[test]
    fn completed_steps_never_shrink(ops in ops()) {
        let policy = RiskPolicy::default();
        let mut state = ready_state();
        for op in ops {
            let before = state.completed_steps().clone();
            match op {
                Op::Advance => {
                    let transition = state.advance(&policy).unwrap();
                    state = transition.next;
                }
                Op::Visit(n) => {
                    if let Ok(next) = state.set_step(Step::from_number(n).unwrap()) {
                        state = next;
                    }
                }
            }
            prop_assert!(state.completed_steps().is_superset(&before));
            // gates all hold, so completed steps form a prefix and the
            // pointer never passes the first uncompleted step
            let done = state.completed_steps().len();
            let prefix: Vec<u8> = state.completed_steps().iter().map(|s| s.number()).collect();
            prop_assert_eq!(prefix, (1..=done as u8).collect::<Vec<u8>>());
            prop_assert!(usize::from(state.step().number()) <= done + 1);
        }
    }

    #[test]
    fn completion_requires_low_risk_and_all_signatures(
        (sev, lik) in ratings(),
        signed in prop::collection::vec(any::<bool>(), 3),
        reverse in any::<bool>(),
    ) {
        // plan text only; the ratings under test follow
        let mut updates: Vec<FieldUpdate> = lowered_fall_hazard().into_iter().skip(2).collect();
        updates.push(FieldUpdate::NewSeverity { hazard: FALL_HAZARD.into(), rating: rating(sev) });
        updates.push(FieldUpdate::NewLikelihood { hazard: FALL_HAZARD.into(), rating: rating(lik) });
        for (role, on) in SignatoryRole::ALL.into_iter().zip(&signed) {
            if *on {
                updates.extend(signature(role));
            }
        }
        if reverse {
            // signatures land before the ratings and plan text
            updates.reverse();
        }

        let ctx = fall_context(1);
        let escalated = ctx.escalated(&RiskPolicy::default());
        let state = updates.into_iter().fold(
            WorkflowState::new(srb_workflow::SrbForm::seeded(&ctx, escalated)),
            |s, change| s.update(change).unwrap(),
        );

        let policy = RiskPolicy::default();
        let expected = sev * lik <= 3 && signed.iter().all(|s| *s);
        prop_assert_eq!(can_complete(state.form(), &policy).is_ok(), expected);

        let record = SrbRecord::from_new(RecordId(1), state.form().to_new_record(), chrono::Utc::now());
        prop_assert_eq!(CompletionValidator::new(policy).check_record(&record).is_ok(), expected);
    }
}

#[test]
fn advance_is_idempotent_at_last_step() {
    let policy = RiskPolicy::default();
    let mut state = ready_state();
    while state.step() != Step::LAST {
        state = state.advance(&policy).unwrap().next;
    }
    let first = state.advance(&policy).unwrap();
    let second = first.next.advance(&policy).unwrap();
    assert_eq!(first.next.step(), Step::LAST);
    assert_eq!(second.next, first.next);
    assert_eq!(second.save, first.save);
    assert!(matches!(first.save, SavePlan::Create(_)));
}
