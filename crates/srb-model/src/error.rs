//! Error types for the SRB data model

use crate::record::SignatoryRole;

/// Invalid severity/likelihood value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
    /// Value outside 1..=4
    #[error("rating must be between 1 and 4, got {0}")]
    OutOfRange(u8),
}

/// Structural violations of an SRB record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// No hazard was escalated
    #[error("an SRB record needs at least one escalated hazard")]
    NoEscalatedHazards,

    /// Escalated hazard has no frozen original assessment
    #[error("escalated hazard '{0}' has no original assessment")]
    MissingOriginalAssessment(String),

    /// Reassessments do not line up one-to-one with escalated hazards
    #[error("reassessments must match escalated hazards in order: expected {expected:?}, got {actual:?}")]
    ReassessmentMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// Reassessment's copied original values differ from the frozen snapshot
    #[error("original values for '{0}' are frozen and cannot change")]
    FrozenOriginalChanged(String),

    /// The frozen assessment snapshot was altered
    #[error("original assessments are frozen once the SRB snapshot is taken")]
    FrozenSnapshotChanged,

    /// Same team member listed twice
    #[error("duplicate team member: {0}")]
    DuplicateTeamMember(String),

    /// Signatory list does not hold exactly the three mandatory roles
    #[error("signatories must be exactly the three mandatory roles, missing {0:?}")]
    SignatoryRoles(Vec<SignatoryRole>),

    /// Same signatory role listed twice
    #[error("signatory role listed more than once: {0}")]
    DuplicateSignatoryRole(SignatoryRole),

    /// Same hazard escalated twice
    #[error("hazard '{0}' is escalated more than once")]
    DuplicateEscalatedHazard(String),

    /// Status can only reach `completed` through the completion path
    #[error("status 'completed' can only be set by completing the record")]
    CompletionBypass,

    /// Completed records are terminal
    #[error("record {0} is completed and can no longer change")]
    Terminal(u64),
}
