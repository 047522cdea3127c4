//! SRB record types
//!
//! Typed replacements for the loosely-shaped record columns:
//! - [`PreQuestions`], [`Acknowledgements`] and [`Signatories`] have fixed fields
//! - [`Reassessment`] is one entry per escalated hazard, in escalation order
//! - [`SrbRecord`] is the stored record, [`NewSrbRecord`] the create payload and
//!   [`SrbRecordPatch`] the merge payload

use crate::error::RecordError;
use crate::hazard::{AssessmentMap, HazardAssessment};
use crate::rating::{Rating, RiskScore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

/// Store-assigned record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the originating safety plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SafetyPlanId(pub u64);

impl Display for SafetyPlanId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Record lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordStatus {
    /// Created, never autosaved
    #[default]
    Draft,
    /// Being worked through the wizard
    InProgress,
    /// All completion rules satisfied (terminal)
    Completed,
    /// Rejected by the board
    Rejected,
}

impl RecordStatus {
    /// Whether a session may still resume this record
    #[inline]
    #[must_use]
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Completed)
    }

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

impl Display for RecordStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown record status: {other}")),
        }
    }
}

/// Yes/no answer used by the informational pre-questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    #[default]
    No,
}

/// Pre-SRB justification questions (step 1)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreQuestions {
    pub reason_for_escalation: String,
    pub procedure_or_condition: String,
    pub service_order_number: String,
    pub coach_update_needed: YesNo,
    pub customer_safety_completed: YesNo,
}

/// Second assessment cycle for one escalated hazard (step 3)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reassessment {
    pub hazard_name: String,
    pub original_severity: Rating,
    pub original_likelihood: Rating,
    pub original_risk_score: RiskScore,
    pub original_mitigation: String,
    #[serde(default)]
    pub additional_safety_measures: String,
    #[serde(default)]
    pub mitigation_plan: String,
    pub new_severity: Rating,
    pub new_likelihood: Rating,
}

impl Reassessment {
    /// Start a reassessment from the frozen original assessment
    ///
    /// New ratings start at the minimum and text fields are empty.
    #[must_use]
    pub fn from_original(hazard_name: impl Into<String>, original: &HazardAssessment) -> Self {
        Self {
            hazard_name: hazard_name.into(),
            original_severity: original.severity,
            original_likelihood: original.likelihood,
            original_risk_score: original.risk_score(),
            original_mitigation: original.mitigation.clone(),
            additional_safety_measures: String::new(),
            mitigation_plan: String::new(),
            new_severity: Rating::MIN,
            new_likelihood: Rating::MIN,
        }
    }

    /// Reassessed score
    #[inline]
    #[must_use]
    pub fn new_risk_score(&self) -> RiskScore {
        RiskScore::of(self.new_severity, self.new_likelihood)
    }

    /// Both free-text fields filled in
    #[must_use]
    pub fn has_plan_text(&self) -> bool {
        !self.additional_safety_measures.trim().is_empty() && !self.mitigation_plan.trim().is_empty()
    }

    fn matches_original(&self, original: &HazardAssessment) -> bool {
        self.original_severity == original.severity
            && self.original_likelihood == original.likelihood
            && self.original_risk_score == original.risk_score()
            && self.original_mitigation == original.mitigation
    }
}

/// Post-mitigation acknowledgement questions (step 4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AckKey {
    HazardReEvaluated,
    ParticipantsReviewed,
    ControlsValidated,
    ResidualRiskAgreed,
    SafeActionAcknowledged,
    NewRiskAcceptable,
}

impl AckKey {
    /// All six keys in display order
    pub const ALL: [AckKey; 6] = [
        Self::HazardReEvaluated,
        Self::ParticipantsReviewed,
        Self::ControlsValidated,
        Self::ResidualRiskAgreed,
        Self::SafeActionAcknowledged,
        Self::NewRiskAcceptable,
    ];

    /// Question text
    #[must_use]
    pub fn question(self) -> &'static str {
        match self {
            Self::HazardReEvaluated => "Has the hazard been fully re-evaluated?",
            Self::ParticipantsReviewed => {
                "Have all SRB participants reviewed the new mitigations?"
            }
            Self::ControlsValidated => {
                "Has the team validated that the new control measures are workable?"
            }
            Self::ResidualRiskAgreed => "Has the team discussed and agreed on the residual risk?",
            Self::SafeActionAcknowledged => {
                "Have all parties acknowledged the new safe plan of action?"
            }
            Self::NewRiskAcceptable => {
                "Is the new hazard value (Severity, Likelihood, Risk) acceptable and at LOW?"
            }
        }
    }
}

/// The six acknowledgement answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Acknowledgements {
    #[serde(rename = "ack1_hazardReEvaluated")]
    pub hazard_re_evaluated: bool,
    #[serde(rename = "ack2_participantsReviewed")]
    pub participants_reviewed: bool,
    #[serde(rename = "ack3_controlsValidated")]
    pub controls_validated: bool,
    #[serde(rename = "ack4_residualRiskAgreed")]
    pub residual_risk_agreed: bool,
    #[serde(rename = "ack5_safeActionAcknowledged")]
    pub safe_action_acknowledged: bool,
    #[serde(rename = "ack6_newRiskAcceptable")]
    pub new_risk_acceptable: bool,
}

impl Acknowledgements {
    /// Read one answer
    #[must_use]
    pub fn get(&self, key: AckKey) -> bool {
        *self.slot(key)
    }

    /// Set one answer
    pub fn set(&mut self, key: AckKey, value: bool) {
        let slot = match key {
            AckKey::HazardReEvaluated => &mut self.hazard_re_evaluated,
            AckKey::ParticipantsReviewed => &mut self.participants_reviewed,
            AckKey::ControlsValidated => &mut self.controls_validated,
            AckKey::ResidualRiskAgreed => &mut self.residual_risk_agreed,
            AckKey::SafeActionAcknowledged => &mut self.safe_action_acknowledged,
            AckKey::NewRiskAcceptable => &mut self.new_risk_acceptable,
        };
        *slot = value;
    }

    /// Questions not yet answered "yes"
    #[must_use]
    pub fn missing(&self) -> Vec<AckKey> {
        AckKey::ALL.into_iter().filter(|k| !self.get(*k)).collect()
    }

    /// All six answered "yes"
    #[inline]
    #[must_use]
    pub fn all_acknowledged(&self) -> bool {
        self.missing().is_empty()
    }

    fn slot(&self, key: AckKey) -> &bool {
        match key {
            AckKey::HazardReEvaluated => &self.hazard_re_evaluated,
            AckKey::ParticipantsReviewed => &self.participants_reviewed,
            AckKey::ControlsValidated => &self.controls_validated,
            AckKey::ResidualRiskAgreed => &self.residual_risk_agreed,
            AckKey::SafeActionAcknowledged => &self.safe_action_acknowledged,
            AckKey::NewRiskAcceptable => &self.new_risk_acceptable,
        }
    }
}

/// Mandatory signatory role
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SignatoryRole {
    #[serde(rename = "EHS Specialist")]
    EhsSpecialist,
    #[serde(rename = "Fab Team Lead")]
    FabTeamLead,
    #[serde(rename = "CS Management", alias = "CS Management Representative")]
    CsManagement,
}

impl SignatoryRole {
    /// The three roles in sign-off order
    pub const ALL: [SignatoryRole; 3] = [Self::EhsSpecialist, Self::FabTeamLead, Self::CsManagement];

    /// Display title
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::EhsSpecialist => "EHS Specialist",
            Self::FabTeamLead => "Fab Team Lead",
            Self::CsManagement => "CS Management Representative",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::EhsSpecialist => 0,
            Self::FabTeamLead => 1,
            Self::CsManagement => 2,
        }
    }
}

impl Display for SignatoryRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One mandatory sign-off (step 5)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signatory {
    pub role: SignatoryRole,
    #[serde(default)]
    pub name: String,
    /// Captured signature image (data URL)
    #[serde(default)]
    pub signature_data: Option<String>,
    #[serde(default)]
    pub signed_at: Option<DateTime<Utc>>,
}

impl Signatory {
    /// Unsigned slot for a role
    #[must_use]
    pub fn unsigned(role: SignatoryRole) -> Self {
        Self {
            role,
            name: String::new(),
            signature_data: None,
            signed_at: None,
        }
    }

    /// Name and signature data both present
    #[must_use]
    pub fn is_signed(&self) -> bool {
        !self.name.trim().is_empty() && self.signature_data.is_some()
    }
}

/// Exactly the three mandatory signatories, one per role
///
/// Serialized as a list for wire compatibility; deserialization rejects lists
/// that do not cover every role exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Signatory>", into = "Vec<Signatory>")]
pub struct Signatories([Signatory; 3]);

impl Signatories {
    /// Slot for a role
    #[must_use]
    pub fn get(&self, role: SignatoryRole) -> &Signatory {
        &self.0[role.index()]
    }

    /// Mutable slot for a role
    pub fn get_mut(&mut self, role: SignatoryRole) -> &mut Signatory {
        &mut self.0[role.index()]
    }

    /// Iterate in sign-off order
    pub fn iter(&self) -> impl Iterator<Item = &Signatory> {
        self.0.iter()
    }

    /// Roles still missing a name or signature
    #[must_use]
    pub fn unsigned_roles(&self) -> Vec<SignatoryRole> {
        self.0
            .iter()
            .filter(|s| !s.is_signed())
            .map(|s| s.role)
            .collect()
    }
}

impl Default for Signatories {
    fn default() -> Self {
        Self(SignatoryRole::ALL.map(Signatory::unsigned))
    }
}

impl TryFrom<Vec<Signatory>> for Signatories {
    type Error = RecordError;

    fn try_from(list: Vec<Signatory>) -> Result<Self, Self::Error> {
        let mut slots: [Option<Signatory>; 3] = [None, None, None];
        for signatory in list {
            let idx = signatory.role.index();
            if slots[idx].is_some() {
                return Err(RecordError::DuplicateSignatoryRole(signatory.role));
            }
            slots[idx] = Some(signatory);
        }
        let missing: Vec<SignatoryRole> = SignatoryRole::ALL
            .into_iter()
            .filter(|r| slots[r.index()].is_none())
            .collect();
        match slots {
            [Some(a), Some(b), Some(c)] => Ok(Self([a, b, c])),
            _ => Err(RecordError::SignatoryRoles(missing)),
        }
    }
}

impl From<Signatories> for Vec<Signatory> {
    fn from(signatories: Signatories) -> Self {
        signatories.0.into()
    }
}

/// Stored SRB record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrbRecord {
    pub id: RecordId,
    pub safety_plan_id: SafetyPlanId,
    pub status: RecordStatus,
    pub service_order_number: String,
    pub pre_questions: PreQuestions,
    pub escalated_hazards: Vec<String>,
    pub original_assessments: AssessmentMap,
    pub reassessments: Vec<Reassessment>,
    pub team_members: Vec<String>,
    pub acknowledgements: Acknowledgements,
    pub signatories: Signatories,
    /// Incremented on every stored mutation
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SrbRecord {
    /// Materialize a create payload
    #[must_use]
    pub fn from_new(id: RecordId, new: NewSrbRecord, now: DateTime<Utc>) -> Self {
        Self {
            id,
            safety_plan_id: new.safety_plan_id,
            status: new.status,
            service_order_number: new.service_order_number,
            pre_questions: new.pre_questions,
            escalated_hazards: new.escalated_hazards,
            original_assessments: new.original_assessments,
            reassessments: new.reassessments,
            team_members: new.team_members,
            acknowledgements: new.acknowledgements,
            signatories: new.signatories,
            version: 1,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Display code, e.g. `SRB-007`
    #[must_use]
    pub fn code(&self) -> String {
        format!("SRB-{:03}", self.id.0)
    }

    /// Check record invariants
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), RecordError> {
        check_structure(
            &self.escalated_hazards,
            &self.original_assessments,
            &self.reassessments,
            &self.team_members,
        )
    }

    /// Merge a patch into the record
    ///
    /// The record is left untouched when the patch is rejected.
    ///
    /// # Errors
    /// - [`RecordError::Terminal`] when the record is already completed
    /// - [`RecordError::CompletionBypass`] when the patch sets `completed`
    /// - [`RecordError::FrozenSnapshotChanged`] when the original assessments differ
    /// - any structural violation of the merged record
    pub fn apply_patch(&mut self, patch: SrbRecordPatch, now: DateTime<Utc>) -> Result<(), RecordError> {
        if self.status == RecordStatus::Completed {
            return Err(RecordError::Terminal(self.id.0));
        }
        if patch.status == Some(RecordStatus::Completed) {
            return Err(RecordError::CompletionBypass);
        }
        if let Some(originals) = &patch.original_assessments {
            if originals != &self.original_assessments {
                return Err(RecordError::FrozenSnapshotChanged);
            }
        }

        let mut next = self.clone();
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(pre_questions) = patch.pre_questions {
            next.service_order_number = pre_questions.service_order_number.clone();
            next.pre_questions = pre_questions;
        }
        if let Some(son) = patch.service_order_number {
            next.service_order_number = son;
        }
        if let Some(hazards) = patch.escalated_hazards {
            next.escalated_hazards = hazards;
        }
        if let Some(reassessments) = patch.reassessments {
            next.reassessments = reassessments;
        }
        if let Some(team) = patch.team_members {
            next.team_members = team;
        }
        if let Some(acks) = patch.acknowledgements {
            next.acknowledgements = acks;
        }
        if let Some(signatories) = patch.signatories {
            next.signatories = signatories;
        }
        next.validate()?;

        next.version += 1;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Transition to the terminal `completed` status
    pub fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.status = RecordStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
        self.version += 1;
    }
}

/// Create payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSrbRecord {
    pub safety_plan_id: SafetyPlanId,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub service_order_number: String,
    #[serde(default)]
    pub pre_questions: PreQuestions,
    pub escalated_hazards: Vec<String>,
    pub original_assessments: AssessmentMap,
    pub reassessments: Vec<Reassessment>,
    #[serde(default)]
    pub team_members: Vec<String>,
    #[serde(default)]
    pub acknowledgements: Acknowledgements,
    #[serde(default)]
    pub signatories: Signatories,
}

impl NewSrbRecord {
    /// Check the payload before it is stored
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.status == RecordStatus::Completed {
            return Err(RecordError::CompletionBypass);
        }
        check_structure(
            &self.escalated_hazards,
            &self.original_assessments,
            &self.reassessments,
            &self.team_members,
        )
    }
}

/// Partial update; `None` fields are left unchanged
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SrbRecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_order_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_questions: Option<PreQuestions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalated_hazards: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_assessments: Option<AssessmentMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reassessments: Option<Vec<Reassessment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_members: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledgements: Option<Acknowledgements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signatories: Option<Signatories>,
    /// Reject the update unless the stored version still matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u64>,
}

fn check_structure(
    escalated: &[String],
    originals: &AssessmentMap,
    reassessments: &[Reassessment],
    team: &[String],
) -> Result<(), RecordError> {
    if escalated.is_empty() {
        return Err(RecordError::NoEscalatedHazards);
    }
    let mut names = HashSet::with_capacity(escalated.len());
    for name in escalated {
        if !names.insert(name.as_str()) {
            return Err(RecordError::DuplicateEscalatedHazard(name.clone()));
        }
        if !originals.contains_key(name) {
            return Err(RecordError::MissingOriginalAssessment(name.clone()));
        }
    }

    let in_order = reassessments.len() == escalated.len()
        && reassessments
            .iter()
            .zip(escalated)
            .all(|(r, name)| &r.hazard_name == name);
    if !in_order {
        return Err(RecordError::ReassessmentMismatch {
            expected: escalated.to_vec(),
            actual: reassessments.iter().map(|r| r.hazard_name.clone()).collect(),
        });
    }
    for r in reassessments {
        // presence checked above
        if let Some(original) = originals.get(&r.hazard_name) {
            if !r.matches_original(original) {
                return Err(RecordError::FrozenOriginalChanged(r.hazard_name.clone()));
            }
        }
    }

    let mut seen = HashSet::with_capacity(team.len());
    for member in team {
        if !seen.insert(member.as_str()) {
            return Err(RecordError::DuplicateTeamMember(member.clone()));
        }
    }
    Ok(())
}
