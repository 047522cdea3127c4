//! Wizard state and its pure transitions
//!
//! [`WorkflowState`] is a plain value. `advance`, `set_step` and `update`
//! return the next state without touching the current one; `advance` also
//! returns the [`SavePlan`] that must succeed before its state is committed.

use crate::error::{FormError, GateFailure, NavigationError};
use crate::form::{FieldUpdate, SrbForm};
use crate::gates::can_advance;
use crate::step::Step;
use srb_model::{NewSrbRecord, RecordId, RiskPolicy, SrbRecord, SrbRecordPatch};
use std::collections::BTreeSet;

/// Stored record the form is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRef {
    pub id: RecordId,
    /// Version returned by the last successful save
    pub version: u64,
}

/// Autosave call required by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavePlan {
    /// No record yet
    Create(NewSrbRecord),
    /// Merge into the bound record
    Update { id: RecordId, patch: SrbRecordPatch },
}

/// Candidate state plus the save that commits it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: WorkflowState,
    pub save: SavePlan,
}

/// Step pointer, completed steps and form contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    step: Step,
    completed: BTreeSet<Step>,
    form: SrbForm,
    record: Option<RecordRef>,
    dirty: bool,
}

impl WorkflowState {
    /// Fresh state at step 1 with no stored record
    #[must_use]
    pub fn new(form: SrbForm) -> Self {
        Self {
            step: Step::FIRST,
            completed: BTreeSet::new(),
            form,
            record: None,
            dirty: false,
        }
    }

    /// State for a reloaded record: step 1, nothing completed
    #[must_use]
    pub fn resumed(form: SrbForm, record: &SrbRecord) -> Self {
        Self {
            record: Some(RecordRef {
                id: record.id,
                version: record.version,
            }),
            ..Self::new(form)
        }
    }

    #[inline]
    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    /// Steps whose gate has passed, never shrinking
    #[inline]
    #[must_use]
    pub fn completed_steps(&self) -> &BTreeSet<Step> {
        &self.completed
    }

    #[inline]
    #[must_use]
    pub fn form(&self) -> &SrbForm {
        &self.form
    }

    #[inline]
    #[must_use]
    pub fn record(&self) -> Option<RecordRef> {
        self.record
    }

    /// Edits since the last successful save
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a step can be selected directly
    #[must_use]
    pub fn can_visit(&self, target: Step) -> bool {
        target == self.step || self.completed.contains(&target)
    }

    /// Autosave for the current form
    #[must_use]
    pub fn save_plan(&self) -> SavePlan {
        match self.record {
            None => SavePlan::Create(self.form.to_new_record()),
            Some(r) => SavePlan::Update {
                id: r.id,
                patch: self.form.to_patch(Some(r.version)),
            },
        }
    }

    /// Check the current gate and build the next state
    ///
    /// The returned state has the current step completed and the pointer
    /// moved on (staying at the last step). It is only valid once its
    /// [`SavePlan`] has succeeded; see [`WorkflowState::saved`].
    ///
    /// # Errors
    /// Returns the failing gate condition.
    pub fn advance(&self, policy: &RiskPolicy) -> Result<Transition, GateFailure> {
        can_advance(self.step, &self.form, policy)?;
        let mut next = self.clone();
        next.completed.insert(self.step);
        next.step = self.step.next();
        Ok(Transition {
            save: self.save_plan(),
            next,
        })
    }

    /// Jump to a completed step or stay on the current one
    ///
    /// # Errors
    /// Returns [`NavigationError::NotReachable`] for any other target.
    pub fn set_step(&self, target: Step) -> Result<Self, NavigationError> {
        if !self.can_visit(target) {
            return Err(NavigationError::NotReachable {
                target,
                current: self.step,
            });
        }
        Ok(Self {
            step: target,
            ..self.clone()
        })
    }

    /// Apply a field edit, marking the state dirty
    ///
    /// # Errors
    /// Returns [`FormError`] when the edit does not apply.
    pub fn update(&self, change: FieldUpdate) -> Result<Self, FormError> {
        let mut next = self.clone();
        next.form.apply(change)?;
        next.dirty = true;
        Ok(next)
    }

    /// Bind to the stored record returned by a successful save
    #[must_use]
    pub fn saved(mut self, record: &SrbRecord) -> Self {
        self.record = Some(RecordRef {
            id: record.id,
            version: record.version,
        });
        self.form.status = record.status;
        self.dirty = false;
        self
    }
}
