//! Escalation trigger
//!
//! Selects the hazards whose initial risk score is above the escalation
//! threshold. Pure: inputs are only read.

use serde::Serialize;
use srb_model::{AssessmentMap, Rating, RiskBand, RiskPolicy, RiskScore};
use std::collections::HashSet;

/// Escalated hazard names, in input order
///
/// Names without an assessment are skipped; a repeated name is kept once,
/// at its first position.
#[must_use]
pub fn escalate(hazards: &[String], assessments: &AssessmentMap, policy: &RiskPolicy) -> Vec<String> {
    let mut seen = HashSet::with_capacity(hazards.len());
    hazards
        .iter()
        .filter(|name| {
            assessments
                .get(name.as_str())
                .is_some_and(|a| policy.escalates(a.risk_score()))
        })
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// One escalated hazard with its scored assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalatedHazard {
    pub name: String,
    pub severity: Rating,
    pub likelihood: Rating,
    pub risk_score: RiskScore,
    pub band: RiskBand,
}

/// Escalated hazards with their scores, in input order
#[must_use]
pub fn escalation_details(
    hazards: &[String],
    assessments: &AssessmentMap,
    policy: &RiskPolicy,
) -> Vec<EscalatedHazard> {
    escalate(hazards, assessments, policy)
        .into_iter()
        .filter_map(|name| {
            let a = assessments.get(&name)?;
            let risk_score = a.risk_score();
            Some(EscalatedHazard {
                severity: a.severity,
                likelihood: a.likelihood,
                risk_score,
                band: risk_score.band(),
                name,
            })
        })
        .collect()
}
