//! The six wizard steps

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Workflow step, numbered 1–6
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Step {
    PreQuestions = 1,
    HazardsAndTeam = 2,
    Reassessment = 3,
    Acknowledgements = 4,
    Signatures = 5,
    IsoReference = 6,
}

impl Step {
    /// All steps in order
    pub const ALL: [Step; 6] = [
        Self::PreQuestions,
        Self::HazardsAndTeam,
        Self::Reassessment,
        Self::Acknowledgements,
        Self::Signatures,
        Self::IsoReference,
    ];

    /// Initial step
    pub const FIRST: Step = Self::PreQuestions;

    /// Final, informational step
    pub const LAST: Step = Self::IsoReference;

    /// 1-based step number
    #[inline]
    #[must_use]
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Step for a 1-based number
    #[must_use]
    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    /// Following step, capped at [`Step::LAST`]
    #[must_use]
    pub fn next(self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(Self::LAST)
    }

    /// Heading shown in the step indicator
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::PreQuestions => "Pre-SRB Questions",
            Self::HazardsAndTeam => "Original Hazards & Team",
            Self::Reassessment => "Hazard Reassessment",
            Self::Acknowledgements => "Post-Mitigation Acknowledgements",
            Self::Signatures => "Mandatory Signatures",
            Self::IsoReference => "ISO Documentation",
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}

impl TryFrom<u8> for Step {
    type Error = String;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::from_number(number).ok_or_else(|| format!("no such step: {number}"))
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step.number()
    }
}
