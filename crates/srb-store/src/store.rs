//! The persistence collaborator consumed by the workflow and the REST layer

use crate::error::StoreResult;
use crate::query::{ListQuery, Page};
use async_trait::async_trait;
use srb_model::{NewSrbRecord, RecordId, SafetyPlanId, SrbRecord, SrbRecordPatch};

/// SRB record persistence
///
/// Implementations must apply each call atomically: a rejected call leaves
/// the stored record unchanged.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store a new record and assign its id
    ///
    /// # Errors
    /// - [`StoreError::Invalid`](crate::StoreError::Invalid) on invariant violations
    /// - [`StoreError::DuplicateOpenRecord`](crate::StoreError::DuplicateOpenRecord)
    ///   when the plan already has a non-completed record
    async fn create(&self, record: NewSrbRecord) -> StoreResult<SrbRecord>;

    /// Merge a patch into a stored record
    ///
    /// # Errors
    /// Not found, stale version, or invariant violations of the merged record.
    async fn update(&self, id: RecordId, patch: SrbRecordPatch) -> StoreResult<SrbRecord>;

    /// Re-validate the completion rules and mark the record completed
    ///
    /// # Errors
    /// [`StoreError::CompletionRejected`](crate::StoreError::CompletionRejected)
    /// naming the unmet rule; the record is not changed.
    async fn complete(&self, id: RecordId) -> StoreResult<SrbRecord>;

    /// Fetch one record
    async fn get(&self, id: RecordId) -> StoreResult<Option<SrbRecord>>;

    /// Most recent record for a safety plan
    async fn find_by_safety_plan(&self, plan: SafetyPlanId) -> StoreResult<Option<SrbRecord>>;

    /// Filtered, windowed listing, newest first
    async fn list(&self, query: &ListQuery) -> StoreResult<Page<SrbRecord>>;

    /// Remove a record; `false` when it did not exist
    async fn delete(&self, id: RecordId) -> StoreResult<bool>;
}
