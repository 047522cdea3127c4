//! Step advancement gates
//!
//! Gates are pure predicates over the form; a failing gate reports the
//! condition that does not hold.

use crate::error::GateFailure;
use crate::form::SrbForm;
use crate::step::Step;
use srb_model::{CompletionValidator, RiskPolicy};

/// Check the gate for leaving `step`
///
/// # Errors
/// Returns the first condition of the gate that does not hold.
pub fn can_advance(step: Step, form: &SrbForm, policy: &RiskPolicy) -> Result<(), GateFailure> {
    match step {
        Step::PreQuestions => pre_questions(form),
        Step::HazardsAndTeam => hazards_and_team(form),
        Step::Reassessment => reassessment(form, policy),
        Step::Acknowledgements => {
            let keys = form.acknowledgements.missing();
            if keys.is_empty() {
                Ok(())
            } else {
                Err(GateFailure::Unacknowledged { keys })
            }
        }
        Step::Signatures => {
            let roles = form.signatories.unsigned_roles();
            if roles.is_empty() {
                Ok(())
            } else {
                Err(GateFailure::MissingSignatures { roles })
            }
        }
        Step::IsoReference => Ok(()),
    }
}

/// Local completion check: the signature gate, then the reassessment gate
///
/// # Errors
/// Returns the first failing gate.
pub fn can_complete(form: &SrbForm, policy: &RiskPolicy) -> Result<(), GateFailure> {
    can_advance(Step::Signatures, form, policy)?;
    can_advance(Step::Reassessment, form, policy)
}

fn pre_questions(form: &SrbForm) -> Result<(), GateFailure> {
    let q = &form.pre_questions;
    let fields: Vec<&'static str> = [
        ("reason for escalation", &q.reason_for_escalation),
        ("procedure or condition", &q.procedure_or_condition),
        ("service order number", &q.service_order_number),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(label, _)| label)
    .collect();
    if fields.is_empty() {
        Ok(())
    } else {
        Err(GateFailure::MissingPreQuestions { fields })
    }
}

fn hazards_and_team(form: &SrbForm) -> Result<(), GateFailure> {
    if form.escalated_hazards.is_empty() {
        return Err(GateFailure::NoEscalatedHazards);
    }
    if form.team_members.is_empty() {
        return Err(GateFailure::NoTeamMembers);
    }
    Ok(())
}

fn reassessment(form: &SrbForm, policy: &RiskPolicy) -> Result<(), GateFailure> {
    let hazards = CompletionValidator::new(*policy).hazards_above_low(&form.reassessments);
    if !hazards.is_empty() {
        return Err(GateFailure::RiskNotLow { hazards });
    }
    let hazards: Vec<String> = form
        .reassessments
        .iter()
        .filter(|r| !r.has_plan_text())
        .map(|r| r.hazard_name.clone())
        .collect();
    if !hazards.is_empty() {
        return Err(GateFailure::MissingMitigationPlan { hazards });
    }
    Ok(())
}
