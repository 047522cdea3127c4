//! SRB Workflow - Safety Review Board escalation
//!
//! The six-step review a high-risk hazard goes through:
//! - [`escalate`] picks the hazards that go to the board
//! - [`WorkflowState`] is the wizard as a value with pure transitions
//! - [`can_advance`] holds the per-step gates
//! - [`WorkflowSession`] drives a state against a [`RecordStore`](srb_store::RecordStore),
//!   committing each transition only after its autosave succeeds
//!
//! # Example
//!
//! ```rust,ignore
//! use srb_workflow::prelude::*;
//!
//! # async fn example(store: std::sync::Arc<dyn srb_store::RecordStore>, ctx: LaunchContext) -> Result<(), WorkflowError> {
//! let outcome = WorkflowSession::launch(store, RiskPolicy::default(), ctx).await?;
//! let Some(mut session) = outcome.into_session() else {
//!     return Ok(()); // no high-risk hazards found
//! };
//! session.update(FieldUpdate::ReasonForEscalation("score 12".into()))?;
//! session.advance().await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod escalation;
pub mod form;
pub mod gates;
pub mod launch;
pub mod session;
pub mod state;
pub mod step;

pub use error::{FormError, GateFailure, NavigationError, WorkflowError};
pub use escalation::{escalate, escalation_details, EscalatedHazard};
pub use form::{FieldUpdate, SrbForm};
pub use gates::{can_advance, can_complete};
pub use launch::{LaunchContext, LaunchKind, LaunchRefusal, LaunchSlot};
pub use session::{ExitDecision, LaunchOutcome, WorkflowSession};
pub use state::{RecordRef, SavePlan, Transition, WorkflowState};
pub use step::Step;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving an SRB session
    pub use crate::{
        FieldUpdate, LaunchContext, LaunchOutcome, LaunchSlot, Step, WorkflowError,
        WorkflowSession,
    };
    pub use srb_model::RiskPolicy;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
