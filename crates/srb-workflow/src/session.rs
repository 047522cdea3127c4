//! Async SRB session over a [`RecordStore`]
//!
//! The session owns one [`WorkflowState`]. Local edits apply immediately;
//! step advances and completion await their save before the new state is
//! committed, so a failed save leaves the session exactly as it was and the
//! call can be retried. Calls take `&mut self`, which serializes autosaves
//! for the record.

use crate::error::WorkflowError;
use crate::form::{FieldUpdate, SrbForm};
use crate::gates::can_complete;
use crate::launch::{LaunchContext, LaunchKind, LaunchRefusal, LaunchSlot};
use crate::state::{SavePlan, WorkflowState};
use crate::step::Step;
use srb_model::{RiskPolicy, SafetyPlanId, SrbRecord};
use srb_store::{RecordStore, StoreError, StoreErrorKind, StoreResult};
use std::sync::Arc;

/// Result of launching a review
#[derive(Debug)]
pub enum LaunchOutcome {
    /// Session ready at step 1
    Ready {
        session: Box<WorkflowSession>,
        kind: LaunchKind,
    },
    /// Launch refused; nothing was created
    Refused(LaunchRefusal),
}

impl LaunchOutcome {
    /// Session, if the launch was not refused
    #[must_use]
    pub fn into_session(self) -> Option<WorkflowSession> {
        match self {
            Self::Ready { session, .. } => Some(*session),
            Self::Refused(_) => None,
        }
    }
}

/// Answer to an exit request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    /// Nothing unsaved; leave directly
    Exit,
    /// Unsaved edits; ask before discarding
    ConfirmDiscard,
}

/// One user's review of one safety plan
pub struct WorkflowSession {
    store: Arc<dyn RecordStore>,
    policy: RiskPolicy,
    state: WorkflowState,
    closed: bool,
}

impl std::fmt::Debug for WorkflowSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowSession")
            .field("policy", &self.policy)
            .field("state", &self.state)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl WorkflowSession {
    /// Start or resume a review for a launch context
    ///
    /// Refused when no hazard escalates. When the plan already has a
    /// non-completed record it is reloaded instead of starting fresh.
    ///
    /// # Errors
    /// Returns [`WorkflowError::Persistence`] when the existing-record lookup
    /// fails.
    pub async fn launch(
        store: Arc<dyn RecordStore>,
        policy: RiskPolicy,
        context: LaunchContext,
    ) -> Result<LaunchOutcome, WorkflowError> {
        let escalated = context.escalated(&policy);
        if escalated.is_empty() {
            tracing::info!(plan = %context.safety_plan_id, "SRB launch refused: no high-risk hazards");
            return Ok(LaunchOutcome::Refused(LaunchRefusal::NoHighRiskHazards));
        }

        let existing = store
            .find_by_safety_plan(context.safety_plan_id)
            .await
            .map_err(WorkflowError::Persistence)?
            .filter(|r| r.status.is_open());

        let (state, kind) = match existing {
            Some(record) => {
                tracing::info!(id = %record.id, plan = %record.safety_plan_id, "resuming SRB record");
                let form = SrbForm::from_record(&record, &context);
                (WorkflowState::resumed(form, &record), LaunchKind::Resumed(record.id))
            }
            None => {
                tracing::info!(
                    plan = %context.safety_plan_id,
                    escalated = escalated.len(),
                    "starting SRB review"
                );
                let form = SrbForm::seeded(&context, escalated);
                (WorkflowState::new(form), LaunchKind::Started)
            }
        };

        Ok(LaunchOutcome::Ready {
            session: Box::new(Self {
                store,
                policy,
                state,
                closed: false,
            }),
            kind,
        })
    }

    /// Launch from the handoff slot, consuming its context
    ///
    /// # Errors
    /// [`WorkflowError::NoLaunchContext`] when the slot is empty, otherwise as
    /// [`WorkflowSession::launch`].
    pub async fn launch_from(
        slot: &LaunchSlot,
        store: Arc<dyn RecordStore>,
        policy: RiskPolicy,
    ) -> Result<LaunchOutcome, WorkflowError> {
        let context = slot.take().ok_or(WorkflowError::NoLaunchContext)?;
        Self::launch(store, policy, context).await
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn step(&self) -> Step {
        self.state.step()
    }

    #[inline]
    #[must_use]
    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    /// Completed or exited
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Apply a field edit
    ///
    /// # Errors
    /// [`WorkflowError::Form`] when the edit does not apply.
    pub fn update(&mut self, change: FieldUpdate) -> Result<(), WorkflowError> {
        self.ensure_open()?;
        self.state = self.state.update(change)?;
        Ok(())
    }

    /// Select a completed step or the current one; no gate, no save
    ///
    /// # Errors
    /// [`WorkflowError::Navigation`] for any other step.
    pub fn set_step(&mut self, target: Step) -> Result<(), WorkflowError> {
        self.ensure_open()?;
        self.state = self.state.set_step(target)?;
        tracing::debug!(step = target.number(), "SRB step selected");
        Ok(())
    }

    /// Pass the current gate, autosave, then move on
    ///
    /// # Errors
    /// - [`WorkflowError::Gate`] naming the failed condition
    /// - [`WorkflowError::Persistence`] when the save fails; state unchanged
    pub async fn advance(&mut self) -> Result<Step, WorkflowError> {
        self.ensure_open()?;
        let from = self.state.step();
        let transition = self
            .state
            .advance(&self.policy)
            .map_err(|failure| WorkflowError::Gate { step: from, failure })?;
        let record = self.persist(transition.save).await?;
        self.state = transition.next.saved(&record);
        tracing::debug!(
            id = %record.id,
            from = from.number(),
            to = self.state.step().number(),
            "SRB step advanced"
        );
        Ok(self.state.step())
    }

    /// Autosave the current form without moving
    ///
    /// # Errors
    /// [`WorkflowError::Persistence`] when the save fails.
    pub async fn save(&mut self) -> Result<SrbRecord, WorkflowError> {
        self.ensure_open()?;
        let record = self.persist(self.state.save_plan()).await?;
        self.state = self.state.clone().saved(&record);
        Ok(record)
    }

    /// Check locally, save, and have the store complete the record
    ///
    /// On success the session closes.
    ///
    /// # Errors
    /// - [`WorkflowError::CompletionBlocked`] when the local check fails
    /// - [`WorkflowError::CompletionRejected`] when the store's re-validation
    ///   refuses; the record stays in progress
    /// - [`WorkflowError::Persistence`] on save failures
    pub async fn complete(&mut self) -> Result<SrbRecord, WorkflowError> {
        self.ensure_open()?;
        can_complete(self.state.form(), &self.policy).map_err(WorkflowError::CompletionBlocked)?;

        let saved = self.save().await?;
        let completed = self.store.complete(saved.id).await.map_err(|e| {
            tracing::warn!(id = %saved.id, error = %e, "SRB completion failed");
            WorkflowError::from_store(e)
        })?;
        self.state = self.state.clone().saved(&completed);
        self.closed = true;
        tracing::info!(id = %completed.id, code = %completed.code(), "SRB review completed");
        Ok(completed)
    }

    /// Whether leaving now needs a discard confirmation
    #[must_use]
    pub fn request_exit(&self) -> ExitDecision {
        if self.state.is_dirty() && !self.closed {
            ExitDecision::ConfirmDiscard
        } else {
            ExitDecision::Exit
        }
    }

    /// Leave the session
    ///
    /// # Errors
    /// [`WorkflowError::UnsavedChanges`] when edits are unsaved and the
    /// discard was not confirmed.
    pub fn exit(&mut self, discard_confirmed: bool) -> Result<(), WorkflowError> {
        if self.request_exit() == ExitDecision::ConfirmDiscard && !discard_confirmed {
            return Err(WorkflowError::UnsavedChanges);
        }
        if self.state.is_dirty() {
            tracing::info!(plan = %self.state.form().safety_plan_id, "discarding unsaved SRB edits");
        }
        self.closed = true;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), WorkflowError> {
        if self.closed {
            Err(WorkflowError::Closed)
        } else {
            Ok(())
        }
    }

    async fn persist(&self, plan: SavePlan) -> Result<SrbRecord, WorkflowError> {
        let result = match plan {
            SavePlan::Create(record) => {
                let plan_id = record.safety_plan_id;
                match self.store.create(record).await {
                    Err(e) if e.kind() == StoreErrorKind::Conflict => {
                        self.adopt_open_record(plan_id, e).await
                    }
                    other => other,
                }
            }
            SavePlan::Update { id, patch } => self.store.update(id, patch).await,
        };
        result.map_err(|e| {
            tracing::error!(error = %e, retryable = e.is_retryable(), "SRB autosave failed");
            WorkflowError::Persistence(e)
        })
    }

    /// Bind to the plan's open record after a create was refused as a duplicate
    ///
    /// Covers a create that reached the store but whose reply was lost: the
    /// current form is written to the open record instead.
    async fn adopt_open_record(&self, plan: SafetyPlanId, conflict: StoreError) -> StoreResult<SrbRecord> {
        let Some(open) = self
            .store
            .find_by_safety_plan(plan)
            .await?
            .filter(|r| r.status.is_open())
        else {
            return Err(conflict);
        };
        tracing::info!(id = %open.id, plan = %plan, "binding session to existing open SRB record");
        self.store
            .update(open.id, self.state.form().to_patch(Some(open.version)))
            .await
    }
}
