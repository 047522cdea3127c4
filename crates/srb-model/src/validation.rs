//! Completion rules
//!
//! The same predicates back the client-side gates and the authoritative check
//! the store runs before marking a record completed. Client gating is
//! advisory; only [`CompletionValidator::check_record`] decides.

use crate::policy::RiskPolicy;
use crate::record::{Reassessment, SignatoryRole, Signatories, SrbRecord};

/// Notification text shown when completion is refused
pub const COMPLETION_HINT: &str = "Ensure all risks are LOW and all signatures are present.";

/// Why a record cannot be completed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionFailure {
    /// At least one reassessed hazard is above the LOW band
    #[error("All escalated hazards must reach LOW risk before completion (not LOW: {})", .hazards.join(", "))]
    RiskNotLow { hazards: Vec<String> },

    /// At least one mandatory signatory lacks a name or signature
    #[error("All three mandatory signatures are required (unsigned: {})", join_roles(.roles))]
    MissingSignatures { roles: Vec<SignatoryRole> },
}

fn join_roles(roles: &[SignatoryRole]) -> String {
    roles
        .iter()
        .map(|r| r.title())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Re-derives the risk and signature predicates at completion time
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionValidator {
    policy: RiskPolicy,
}

impl CompletionValidator {
    /// Create validator for a policy
    #[inline]
    #[must_use]
    pub fn new(policy: RiskPolicy) -> Self {
        Self { policy }
    }

    /// Policy in force
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    /// Hazards whose reassessed score is still above the LOW ceiling
    #[must_use]
    pub fn hazards_above_low(&self, reassessments: &[Reassessment]) -> Vec<String> {
        reassessments
            .iter()
            .filter(|r| !self.policy.is_acceptable(r.new_risk_score()))
            .map(|r| r.hazard_name.clone())
            .collect()
    }

    /// Check the risk rule, then the signature rule
    ///
    /// # Errors
    /// Returns the first unmet rule.
    pub fn check(
        &self,
        reassessments: &[Reassessment],
        signatories: &Signatories,
    ) -> Result<(), CompletionFailure> {
        let hazards = self.hazards_above_low(reassessments);
        if !hazards.is_empty() {
            return Err(CompletionFailure::RiskNotLow { hazards });
        }
        let roles = signatories.unsigned_roles();
        if !roles.is_empty() {
            return Err(CompletionFailure::MissingSignatures { roles });
        }
        Ok(())
    }

    /// Check a stored record
    ///
    /// # Errors
    /// Returns the first unmet rule.
    pub fn check_record(&self, record: &SrbRecord) -> Result<(), CompletionFailure> {
        self.check(&record.reassessments, &record.signatories)
    }
}
