//! Testing utilities for SRB workspace
//!
//! Shared fixtures and a fault-injecting store.

#![allow(missing_docs)]

use async_trait::async_trait;
use srb_model::{
    AssessmentMap, HazardAssessment, NewSrbRecord, Rating, Reassessment, RecordId, RecordStatus,
    SafetyPlanId, Signatories, SignatoryRole, SrbRecord, SrbRecordPatch,
};
use srb_store::{InMemoryRecordStore, ListQuery, Page, RecordStore, StoreError, StoreResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub const FALL_HAZARD: &str = "Fall Hazard";
pub const MINOR_TRIP: &str = "Minor Trip";
pub const ELECTRICAL: &str = "Electrical Shock";

pub fn rating(value: u8) -> Rating {
    Rating::new(value).unwrap()
}

pub fn assessment(severity: u8, likelihood: u8, mitigation: &str) -> HazardAssessment {
    HazardAssessment::new(rating(severity), rating(likelihood), mitigation)
}

/// Fall Hazard 4×3 (escalates) and Minor Trip 1×2 (does not)
pub fn mixed_hazards() -> (Vec<String>, AssessmentMap) {
    let mut map = AssessmentMap::new();
    map.insert(FALL_HAZARD.to_string(), assessment(4, 3, "harness"));
    map.insert(MINOR_TRIP.to_string(), assessment(1, 2, "signage"));
    (vec![FALL_HAZARD.to_string(), MINOR_TRIP.to_string()], map)
}

/// Minor Trip 1×2 only
pub fn minor_hazards() -> (Vec<String>, AssessmentMap) {
    let mut map = AssessmentMap::new();
    map.insert(MINOR_TRIP.to_string(), assessment(1, 2, "signage"));
    (vec![MINOR_TRIP.to_string()], map)
}

/// Reassessment brought down to 1×2 with both plan fields filled
pub fn lowered(mut reassessment: Reassessment) -> Reassessment {
    reassessment.new_severity = rating(1);
    reassessment.new_likelihood = rating(2);
    reassessment.additional_safety_measures = "Guard rails installed".to_string();
    reassessment.mitigation_plan = "Two-person rule, daily inspection".to_string();
    reassessment
}

pub fn signed_signatories() -> Signatories {
    let mut signatories = Signatories::default();
    for role in SignatoryRole::ALL {
        let slot = signatories.get_mut(role);
        slot.name = format!("{role} signer");
        slot.signature_data = Some("data:image/png;base64,AAAA".to_string());
    }
    signatories
}

/// Create payload for one escalated Fall Hazard
pub fn new_record(plan: u64) -> NewSrbRecord {
    let (_, assessments) = mixed_hazards();
    let original = assessments[FALL_HAZARD].clone();
    let mut originals = AssessmentMap::new();
    originals.insert(FALL_HAZARD.to_string(), original.clone());
    NewSrbRecord {
        safety_plan_id: SafetyPlanId(plan),
        status: RecordStatus::InProgress,
        service_order_number: String::new(),
        pre_questions: Default::default(),
        escalated_hazards: vec![FALL_HAZARD.to_string()],
        original_assessments: originals,
        reassessments: vec![Reassessment::from_original(FALL_HAZARD, &original)],
        team_members: vec!["Lead".to_string()],
        acknowledgements: Default::default(),
        signatories: Default::default(),
    }
}

/// In-memory store whose writes can be made to fail on demand
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: InMemoryRecordStore,
    failing: AtomicBool,
    lose_responses: AtomicBool,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every subsequent create/update/complete until reset
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Apply writes but report a transport failure, as when the reply is lost
    pub fn set_losing_responses(&self, lose: bool) {
        self.lose_responses.store(lose, Ordering::SeqCst);
    }

    /// Write calls that reached the inner store
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &InMemoryRecordStore {
        &self.inner
    }

    fn gate(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("injected failure".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn reply<T>(&self, result: StoreResult<T>) -> StoreResult<T> {
        if result.is_ok() && self.lose_responses.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("response lost".to_string()));
        }
        result
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn create(&self, record: NewSrbRecord) -> StoreResult<SrbRecord> {
        self.gate()?;
        self.reply(self.inner.create(record).await)
    }

    async fn update(&self, id: RecordId, patch: SrbRecordPatch) -> StoreResult<SrbRecord> {
        self.gate()?;
        self.reply(self.inner.update(id, patch).await)
    }

    async fn complete(&self, id: RecordId) -> StoreResult<SrbRecord> {
        self.gate()?;
        self.reply(self.inner.complete(id).await)
    }

    async fn get(&self, id: RecordId) -> StoreResult<Option<SrbRecord>> {
        self.inner.get(id).await
    }

    async fn find_by_safety_plan(&self, plan: SafetyPlanId) -> StoreResult<Option<SrbRecord>> {
        self.inner.find_by_safety_plan(plan).await
    }

    async fn list(&self, query: &ListQuery) -> StoreResult<Page<SrbRecord>> {
        self.inner.list(query).await
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        self.inner.delete(id).await
    }
}
