//! Live form state of an SRB session and the field edits applied to it

use crate::error::FormError;
use crate::launch::LaunchContext;
use chrono::{DateTime, Utc};
use srb_model::{
    AckKey, Acknowledgements, AssessmentMap, NewSrbRecord, PreQuestions, Rating, Reassessment,
    RecordStatus, SafetyPlanId, Signatories, SignatoryRole, SrbRecord, SrbRecordPatch, YesNo,
};

/// Everything the wizard edits, plus display-only launch data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrbForm {
    pub safety_plan_id: SafetyPlanId,
    pub status: RecordStatus,
    /// Display only
    pub task_name: String,
    /// Every hazard of the plan, for the step 2 overview; display only
    pub all_hazards: Vec<String>,
    pub pre_questions: PreQuestions,
    pub escalated_hazards: Vec<String>,
    pub original_assessments: AssessmentMap,
    pub reassessments: Vec<Reassessment>,
    pub team_members: Vec<String>,
    pub acknowledgements: Acknowledgements,
    pub signatories: Signatories,
}

impl SrbForm {
    /// Fresh form seeded from a launch context
    ///
    /// `escalated` must be the escalation of the context's hazards.
    #[must_use]
    pub fn seeded(context: &LaunchContext, escalated: Vec<String>) -> Self {
        let reassessments = escalated
            .iter()
            .filter_map(|name| {
                context
                    .assessments
                    .get(name)
                    .map(|original| Reassessment::from_original(name.clone(), original))
            })
            .collect();
        Self {
            safety_plan_id: context.safety_plan_id,
            status: RecordStatus::Draft,
            task_name: context.task_name.clone(),
            all_hazards: context.hazards.clone(),
            pre_questions: PreQuestions::default(),
            escalated_hazards: escalated,
            original_assessments: context.assessments.clone(),
            reassessments,
            team_members: context.team(),
            acknowledgements: Acknowledgements::default(),
            signatories: Signatories::default(),
        }
    }

    /// Form reloaded from a stored record
    #[must_use]
    pub fn from_record(record: &SrbRecord, context: &LaunchContext) -> Self {
        Self {
            safety_plan_id: record.safety_plan_id,
            status: record.status,
            task_name: context.task_name.clone(),
            all_hazards: context.hazards.clone(),
            pre_questions: record.pre_questions.clone(),
            escalated_hazards: record.escalated_hazards.clone(),
            original_assessments: record.original_assessments.clone(),
            reassessments: record.reassessments.clone(),
            team_members: record.team_members.clone(),
            acknowledgements: record.acknowledgements,
            signatories: record.signatories.clone(),
        }
    }

    /// Create payload for the first autosave
    #[must_use]
    pub fn to_new_record(&self) -> NewSrbRecord {
        NewSrbRecord {
            safety_plan_id: self.safety_plan_id,
            status: RecordStatus::InProgress,
            service_order_number: self.pre_questions.service_order_number.clone(),
            pre_questions: self.pre_questions.clone(),
            escalated_hazards: self.escalated_hazards.clone(),
            original_assessments: self.original_assessments.clone(),
            reassessments: self.reassessments.clone(),
            team_members: self.team_members.clone(),
            acknowledgements: self.acknowledgements,
            signatories: self.signatories.clone(),
        }
    }

    /// Merge payload for later autosaves
    ///
    /// The frozen original assessments are never resent.
    #[must_use]
    pub fn to_patch(&self, expected_version: Option<u64>) -> SrbRecordPatch {
        SrbRecordPatch {
            status: Some(RecordStatus::InProgress),
            service_order_number: Some(self.pre_questions.service_order_number.clone()),
            pre_questions: Some(self.pre_questions.clone()),
            escalated_hazards: Some(self.escalated_hazards.clone()),
            original_assessments: None,
            reassessments: Some(self.reassessments.clone()),
            team_members: Some(self.team_members.clone()),
            acknowledgements: Some(self.acknowledgements),
            signatories: Some(self.signatories.clone()),
            expected_version,
        }
    }

    /// Apply one edit in place
    ///
    /// # Errors
    /// Returns [`FormError`] when the edit does not apply; the form is then
    /// unchanged.
    pub fn apply(&mut self, update: FieldUpdate) -> Result<(), FormError> {
        match update {
            FieldUpdate::ReasonForEscalation(text) => self.pre_questions.reason_for_escalation = text,
            FieldUpdate::ProcedureOrCondition(text) => {
                self.pre_questions.procedure_or_condition = text;
            }
            FieldUpdate::ServiceOrderNumber(text) => self.pre_questions.service_order_number = text,
            FieldUpdate::CoachUpdateNeeded(answer) => self.pre_questions.coach_update_needed = answer,
            FieldUpdate::CustomerSafetyCompleted(answer) => {
                self.pre_questions.customer_safety_completed = answer;
            }
            FieldUpdate::AddTeamMember(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(FormError::EmptyTeamMember);
                }
                if self.team_members.iter().any(|m| m == name) {
                    return Err(FormError::DuplicateTeamMember(name.to_string()));
                }
                self.team_members.push(name.to_string());
            }
            FieldUpdate::RemoveTeamMember(name) => {
                let idx = self
                    .team_members
                    .iter()
                    .position(|m| *m == name)
                    .ok_or(FormError::UnknownTeamMember(name))?;
                self.team_members.remove(idx);
            }
            FieldUpdate::AdditionalSafetyMeasures { hazard, text } => {
                self.reassessment_mut(&hazard)?.additional_safety_measures = text;
            }
            FieldUpdate::MitigationPlan { hazard, text } => {
                self.reassessment_mut(&hazard)?.mitigation_plan = text;
            }
            FieldUpdate::NewSeverity { hazard, rating } => {
                self.reassessment_mut(&hazard)?.new_severity = rating;
            }
            FieldUpdate::NewLikelihood { hazard, rating } => {
                self.reassessment_mut(&hazard)?.new_likelihood = rating;
            }
            FieldUpdate::Acknowledge { key, value } => self.acknowledgements.set(key, value),
            FieldUpdate::SignatoryName { role, name } => self.signatories.get_mut(role).name = name,
            FieldUpdate::Sign {
                role,
                signature_data,
                signed_at,
            } => {
                if signature_data.is_empty() {
                    return Err(FormError::EmptySignature);
                }
                let slot = self.signatories.get_mut(role);
                slot.signature_data = Some(signature_data);
                slot.signed_at = Some(signed_at);
            }
            FieldUpdate::ClearSignature { role } => {
                let slot = self.signatories.get_mut(role);
                slot.signature_data = None;
                slot.signed_at = None;
            }
        }
        Ok(())
    }

    fn reassessment_mut(&mut self, hazard: &str) -> Result<&mut Reassessment, FormError> {
        self.reassessments
            .iter_mut()
            .find(|r| r.hazard_name == hazard)
            .ok_or_else(|| FormError::UnknownHazard(hazard.to_string()))
    }
}

/// One user edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    ReasonForEscalation(String),
    ProcedureOrCondition(String),
    ServiceOrderNumber(String),
    CoachUpdateNeeded(YesNo),
    CustomerSafetyCompleted(YesNo),
    AddTeamMember(String),
    RemoveTeamMember(String),
    AdditionalSafetyMeasures { hazard: String, text: String },
    MitigationPlan { hazard: String, text: String },
    NewSeverity { hazard: String, rating: Rating },
    NewLikelihood { hazard: String, rating: Rating },
    Acknowledge { key: AckKey, value: bool },
    SignatoryName { role: SignatoryRole, name: String },
    /// Capture a signature image; stamps `signed_at`
    Sign {
        role: SignatoryRole,
        signature_data: String,
        signed_at: DateTime<Utc>,
    },
    ClearSignature { role: SignatoryRole },
}
