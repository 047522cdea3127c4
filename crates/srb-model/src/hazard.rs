//! Hazard assessments produced by safety plan authoring

use crate::rating::{Rating, RiskScore};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Hazard name → assessment, in authoring order
pub type AssessmentMap = IndexMap<String, HazardAssessment>;

/// Severity/likelihood/mitigation triple for one hazard
///
/// The hazard name is the key of the owning [`AssessmentMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardAssessment {
    pub severity: Rating,
    pub likelihood: Rating,
    #[serde(default)]
    pub mitigation: String,
}

impl HazardAssessment {
    /// Create new assessment
    #[inline]
    #[must_use]
    pub fn new(severity: Rating, likelihood: Rating, mitigation: impl Into<String>) -> Self {
        Self {
            severity,
            likelihood,
            mitigation: mitigation.into(),
        }
    }

    /// severity × likelihood
    #[inline]
    #[must_use]
    pub fn risk_score(&self) -> RiskScore {
        RiskScore::of(self.severity, self.likelihood)
    }
}
