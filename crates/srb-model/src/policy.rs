//! Site risk policy thresholds

use crate::rating::RiskScore;
use serde::{Deserialize, Serialize};

/// Escalation and acceptance thresholds
///
/// Defaults match the site procedure: hazards scoring above 5 escalate to the
/// board, and reassessed hazards must reach the LOW band (3 or less).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    /// Scores strictly above this escalate
    pub escalation_threshold: u8,
    /// Highest score accepted at completion
    pub low_risk_ceiling: u8,
}

impl RiskPolicy {
    /// Default policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With escalation threshold
    #[inline]
    #[must_use]
    pub fn with_escalation_threshold(mut self, threshold: u8) -> Self {
        self.escalation_threshold = threshold;
        self
    }

    /// With LOW band ceiling
    #[inline]
    #[must_use]
    pub fn with_low_risk_ceiling(mut self, ceiling: u8) -> Self {
        self.low_risk_ceiling = ceiling;
        self
    }

    /// Whether a score must go to the board
    #[inline]
    #[must_use]
    pub fn escalates(&self, score: RiskScore) -> bool {
        score.get() > self.escalation_threshold
    }

    /// Whether a reassessed score is acceptable
    #[inline]
    #[must_use]
    pub fn is_acceptable(&self, score: RiskScore) -> bool {
        score.get() <= self.low_risk_ceiling
    }
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            escalation_threshold: 5,
            low_risk_ceiling: 3,
        }
    }
}
