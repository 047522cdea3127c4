//! Error types for the SRB workflow
//!
//! Every rejection names the unmet condition:
//! - [`GateFailure`]: a step gate does not hold (local, no mutation)
//! - [`NavigationError`]: a step jump the wizard does not allow
//! - [`FormError`]: a field edit that does not apply to the form
//! - [`WorkflowError`]: session-level failures, including persistence

use crate::step::Step;
use srb_model::{AckKey, SignatoryRole, COMPLETION_HINT};
use srb_store::{StoreError, StoreErrorKind};

/// Why a step gate does not hold
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateFailure {
    /// Step 1 answers missing
    #[error("pre-SRB questions unanswered: {}", .fields.join(", "))]
    MissingPreQuestions { fields: Vec<&'static str> },

    /// Step 2 has nothing to review
    #[error("no escalated hazards to review")]
    NoEscalatedHazards,

    /// Step 2 has no team
    #[error("at least one SRB team member is required")]
    NoTeamMembers,

    /// Step 3 risk above the LOW ceiling
    #[error("hazards not yet at LOW risk: {}", .hazards.join(", "))]
    RiskNotLow { hazards: Vec<String> },

    /// Step 3 plan text missing
    #[error("additional safety measures and mitigation plan required for: {}", .hazards.join(", "))]
    MissingMitigationPlan { hazards: Vec<String> },

    /// Step 4 answers not all "yes"
    #[error("unacknowledged: {}", questions(.keys))]
    Unacknowledged { keys: Vec<AckKey> },

    /// Step 5 signatures missing
    #[error("signatures missing for: {}", role_titles(.roles))]
    MissingSignatures { roles: Vec<SignatoryRole> },
}

fn questions(keys: &[AckKey]) -> String {
    keys.iter()
        .map(|k| k.question())
        .collect::<Vec<_>>()
        .join(" / ")
}

fn role_titles(roles: &[SignatoryRole]) -> String {
    roles
        .iter()
        .map(|r| r.title())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Disallowed step jump
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// Target is neither completed nor current
    #[error("{target} is not reachable from {current}")]
    NotReachable { target: Step, current: Step },
}

/// Field edit that cannot be applied
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// No reassessment for the hazard
    #[error("hazard is not escalated: {0}")]
    UnknownHazard(String),

    /// Blank team member name
    #[error("team member name is empty")]
    EmptyTeamMember,

    /// Team member already listed
    #[error("already on the team: {0}")]
    DuplicateTeamMember(String),

    /// Team member not listed
    #[error("not on the team: {0}")]
    UnknownTeamMember(String),

    /// Blank signature capture
    #[error("signature data is empty")]
    EmptySignature,
}

/// Session-level errors
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Launch slot was empty or already consumed
    #[error("no SRB launch context available")]
    NoLaunchContext,

    /// Gate for the current step does not hold
    #[error("cannot leave {step}: {failure}")]
    Gate { step: Step, failure: GateFailure },

    /// Step jump refused
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// Field edit refused
    #[error(transparent)]
    Form(#[from] FormError),

    /// Local completion check failed
    #[error("{COMPLETION_HINT} ({0})")]
    CompletionBlocked(GateFailure),

    /// Store re-validation refused completion
    #[error("completion rejected by the record store: {0}")]
    CompletionRejected(String),

    /// Exit requested with unsaved edits
    #[error("unsaved changes; confirm discard to exit")]
    UnsavedChanges,

    /// Save or read against the store failed
    #[error("SRB record persistence failed: {0}")]
    Persistence(#[source] StoreError),

    /// Session was completed or exited
    #[error("SRB session is closed")]
    Closed,
}

impl WorkflowError {
    /// Wrap a store failure, keeping completion rejections distinct
    #[must_use]
    pub fn from_store(err: StoreError) -> Self {
        if err.kind() == StoreErrorKind::CompletionRejected {
            Self::CompletionRejected(err.to_string())
        } else {
            Self::Persistence(err)
        }
    }

    /// Check if the same call may succeed when retried unchanged
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(e) if e.is_retryable())
    }

    /// Check if this is a local validation rejection
    #[inline]
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Gate { .. }
                | Self::Navigation(_)
                | Self::Form(_)
                | Self::CompletionBlocked(_)
                | Self::UnsavedChanges
        )
    }
}
