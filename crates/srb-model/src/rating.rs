//! Severity/likelihood ratings and derived risk scores
//!
//! Provides:
//! - [`Rating`]: a validated 1..=4 rating used for both severity and likelihood
//! - [`RiskScore`]: severity × likelihood (1..=16)
//! - [`RiskBand`]: LOW / MEDIUM / HIGH / EXTREME classification of a score

use crate::error::RatingError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Severity or likelihood rating, always within `1..=4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest rating
    pub const MIN: Rating = Rating(1);
    /// Highest rating
    pub const MAX: Rating = Rating(4);

    /// Create a rating, rejecting values outside `1..=4`
    ///
    /// # Errors
    /// Returns [`RatingError::OutOfRange`] for any other value.
    #[inline]
    pub fn new(value: u8) -> Result<Self, RatingError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError::OutOfRange(value))
        }
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Human label when used as a severity
    #[must_use]
    pub fn severity_label(self) -> &'static str {
        match self.0 {
            1 => "Negligible",
            2 => "Minor",
            3 => "Major",
            _ => "Catastrophic",
        }
    }

    /// Human label when used as a likelihood
    #[must_use]
    pub fn likelihood_label(self) -> &'static str {
        match self.0 {
            1 => "Unlikely",
            2 => "Possible",
            3 => "Likely",
            _ => "Almost Certain",
        }
    }

    /// All valid ratings in ascending order
    pub fn all() -> impl Iterator<Item = Rating> {
        (Self::MIN.0..=Self::MAX.0).map(Rating)
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Risk score: severity × likelihood
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Compute the score for a severity/likelihood pair
    #[inline]
    #[must_use]
    pub fn of(severity: Rating, likelihood: Rating) -> Self {
        Self(severity.0 * likelihood.0)
    }

    /// Raw value (1..=16)
    #[inline]
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Band classification
    #[inline]
    #[must_use]
    pub fn band(self) -> RiskBand {
        RiskBand::classify(self)
    }
}

impl Display for RiskScore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskBand {
    /// 1–3
    Low,
    /// 4–7
    Medium,
    /// 8–11
    High,
    /// 12–16
    Extreme,
}

impl RiskBand {
    /// Classify a score
    #[must_use]
    pub fn classify(score: RiskScore) -> Self {
        match score.0 {
            12..=u8::MAX => Self::Extreme,
            8..=11 => Self::High,
            4..=7 => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Display label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Extreme => "Extreme",
        }
    }
}

impl Display for RiskBand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
