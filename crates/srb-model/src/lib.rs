//! SRB Model
//!
//! Typed records for the Safety Review Board escalation workflow.
//!
//! # Core Concepts
//!
//! - [`Rating`], [`RiskScore`], [`RiskBand`]: severity × likelihood risk matrix
//! - [`HazardAssessment`]: per-hazard triple authored in the safety plan
//! - [`SrbRecord`]: the persisted review, with typed pre-questions,
//!   reassessments, acknowledgements and signatories
//! - [`CompletionValidator`]: authoritative completion rules
//!
//! # Example
//!
//! ```rust
//! use srb_model::{HazardAssessment, Rating, RiskBand};
//!
//! let fall = HazardAssessment::new(Rating::new(4)?, Rating::new(3)?, "harness");
//! assert_eq!(fall.risk_score().get(), 12);
//! assert_eq!(fall.risk_score().band(), RiskBand::Extreme);
//! # Ok::<(), srb_model::RatingError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod hazard;
mod iso;
mod policy;
mod rating;
mod record;
mod validation;

pub use error::{RatingError, RecordError};
pub use hazard::{AssessmentMap, HazardAssessment};
pub use iso::{IsoSection, ISO_REFERENCE};
pub use policy::RiskPolicy;
pub use rating::{Rating, RiskBand, RiskScore};
pub use record::{
    AckKey, Acknowledgements, NewSrbRecord, PreQuestions, Reassessment, RecordId, RecordStatus,
    SafetyPlanId, Signatories, Signatory, SignatoryRole, SrbRecord, SrbRecordPatch, YesNo,
};
pub use validation::{CompletionFailure, CompletionValidator, COMPLETION_HINT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
