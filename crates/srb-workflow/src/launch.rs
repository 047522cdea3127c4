//! Launch-context handoff from safety plan authoring
//!
//! The authoring flow places a [`LaunchContext`] into a session-scoped
//! [`LaunchSlot`]; the SRB session takes it exactly once.

use crate::escalation::escalate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use srb_model::{AssessmentMap, RecordId, RiskPolicy, SafetyPlanId};
use std::fmt::{self, Display, Formatter};

/// Data needed to start or resume a review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchContext {
    pub safety_plan_id: SafetyPlanId,
    #[serde(default)]
    pub task_name: String,
    #[serde(default)]
    pub lead_name: String,
    #[serde(default)]
    pub engineers: Vec<String>,
    /// Every hazard of the plan, in authoring order
    pub hazards: Vec<String>,
    pub assessments: AssessmentMap,
}

impl LaunchContext {
    /// Initial team: lead then engineers, blanks and repeats dropped
    #[must_use]
    pub fn team(&self) -> Vec<String> {
        let mut team: Vec<String> = Vec::with_capacity(self.engineers.len() + 1);
        for name in std::iter::once(&self.lead_name).chain(&self.engineers) {
            let name = name.trim();
            if !name.is_empty() && !team.iter().any(|m| m == name) {
                team.push(name.to_string());
            }
        }
        team
    }

    /// Hazards that go to the board under a policy
    #[must_use]
    pub fn escalated(&self, policy: &RiskPolicy) -> Vec<String> {
        escalate(&self.hazards, &self.assessments, policy)
    }
}

/// Single-use handoff slot
#[derive(Debug, Default)]
pub struct LaunchSlot {
    context: Mutex<Option<LaunchContext>>,
}

impl LaunchSlot {
    /// Empty slot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a context, replacing any unconsumed one
    pub fn put(&self, context: LaunchContext) -> Option<LaunchContext> {
        self.context.lock().replace(context)
    }

    /// Consume the context; later calls see `None`
    pub fn take(&self) -> Option<LaunchContext> {
        self.context.lock().take()
    }

    /// Whether a context is waiting
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.context.lock().is_none()
    }
}

/// Why a launch was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchRefusal {
    /// No hazard scored above the escalation threshold
    NoHighRiskHazards,
}

impl Display for LaunchRefusal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHighRiskHazards => f.write_str("no high-risk hazards found"),
        }
    }
}

/// How a launch began
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchKind {
    /// New review; the record is created on the first autosave
    Started,
    /// Existing open record reloaded
    Resumed(RecordId),
}
