//! In-memory record store with optional JSON snapshot file
//!
//! Writes are serialized per record through [`WriteLocks`]; a record's
//! mutations (and their snapshot flush) never interleave. With a snapshot
//! file configured, each mutation is applied to a copy of the table, the copy
//! is written to disk (temp file + rename), and only then swapped in, so a
//! failed write leaves both memory and disk at the previous state.

use crate::error::{StoreError, StoreResult};
use crate::query::{ListQuery, Page};
use crate::store::RecordStore;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use srb_model::{
    CompletionValidator, NewSrbRecord, RecordError, RecordId, RiskPolicy, SafetyPlanId, SrbRecord,
    SrbRecordPatch,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

type Table = BTreeMap<RecordId, SrbRecord>;

/// Per-record async write locks
#[derive(Debug, Default)]
struct WriteLocks {
    locks: DashMap<RecordId, Arc<Mutex<()>>>,
}

impl WriteLocks {
    fn for_record(&self, id: RecordId) -> Arc<Mutex<()>> {
        self.locks.entry(id).or_default().clone()
    }

    fn forget(&self, id: RecordId) {
        self.locks.remove(&id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Snapshot file binding
#[derive(Debug)]
struct Snapshot {
    path: PathBuf,
    /// Serializes copy → write → swap
    flush: Mutex<()>,
}

impl Snapshot {
    async fn write(&self, table: &Table) -> StoreResult<()> {
        let records: Vec<&SrbRecord> = table.values().collect();
        let bytes = serde_json::to_vec_pretty(&records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| StoreError::snapshot(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::snapshot(&self.path, e))?;
        Ok(())
    }
}

/// Record store held in memory
#[derive(Debug)]
pub struct InMemoryRecordStore {
    records: RwLock<Table>,
    next_id: AtomicU64,
    locks: WriteLocks,
    validator: CompletionValidator,
    snapshot: Option<Snapshot>,
}

impl InMemoryRecordStore {
    /// Empty store with the default risk policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(RiskPolicy::default())
    }

    /// Empty store enforcing a policy at completion
    #[must_use]
    pub fn with_policy(policy: RiskPolicy) -> Self {
        Self {
            records: RwLock::new(Table::new()),
            next_id: AtomicU64::new(1),
            locks: WriteLocks::default(),
            validator: CompletionValidator::new(policy),
            snapshot: None,
        }
    }

    /// Store bound to a snapshot file, loading it when it exists
    ///
    /// # Errors
    /// Returns an error when the file exists but cannot be read or parsed.
    pub async fn open(path: impl AsRef<Path>, policy: RiskPolicy) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut table = Table::new();
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let records: Vec<SrbRecord> = serde_json::from_slice(&bytes)?;
                for record in records {
                    table.insert(record.id, record);
                }
                tracing::info!(path = %path.display(), records = table.len(), "loaded SRB snapshot");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no SRB snapshot yet, starting empty");
            }
            Err(e) => return Err(StoreError::snapshot(&path, e)),
        }
        let next = table.keys().next_back().map_or(1, |id| id.0 + 1);

        let mut store = Self::with_policy(policy);
        store.records = RwLock::new(table);
        store.next_id = AtomicU64::new(next);
        store.snapshot = Some(Snapshot {
            path,
            flush: Mutex::new(()),
        });
        Ok(store)
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Policy enforced at completion
    #[must_use]
    pub fn policy(&self) -> &RiskPolicy {
        self.validator.policy()
    }

    /// Write lock for a stored record
    ///
    /// Unknown ids never get an entry. A lock handed out just before a delete
    /// is dropped again by the caller on its not-found path.
    fn lock_existing(&self, id: RecordId) -> StoreResult<Arc<Mutex<()>>> {
        if !self.records.read().contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        Ok(self.locks.for_record(id))
    }

    /// Forget the lock of a record that turned out to be gone
    fn release_missing<T>(&self, id: RecordId, result: StoreResult<T>) -> StoreResult<T> {
        if matches!(result, Err(StoreError::NotFound(missing)) if missing == id) {
            self.locks.forget(id);
        }
        result
    }

    /// Apply a mutation atomically, flushing the snapshot when configured
    async fn mutate<T>(&self, f: impl FnOnce(&mut Table) -> StoreResult<T>) -> StoreResult<T> {
        match &self.snapshot {
            None => {
                let mut table = self.records.write();
                f(&mut *table)
            }
            Some(snapshot) => {
                let _flush = snapshot.flush.lock().await;
                let mut next = self.records.read().clone();
                let out = f(&mut next)?;
                snapshot.write(&next).await?;
                *self.records.write() = next;
                Ok(out)
            }
        }
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(&self, record: NewSrbRecord) -> StoreResult<SrbRecord> {
        record.validate()?;
        let plan = record.safety_plan_id;
        let created = self
            .mutate(|table| {
                if let Some(open) = table
                    .values()
                    .find(|r| r.safety_plan_id == plan && r.status.is_open())
                {
                    return Err(StoreError::DuplicateOpenRecord {
                        plan,
                        existing: open.id,
                    });
                }
                let id = RecordId(self.next_id.fetch_add(1, Ordering::SeqCst));
                let stored = SrbRecord::from_new(id, record, Utc::now());
                table.insert(id, stored.clone());
                Ok(stored)
            })
            .await?;
        tracing::info!(id = %created.id, plan = %plan, "created SRB record");
        Ok(created)
    }

    async fn update(&self, id: RecordId, patch: SrbRecordPatch) -> StoreResult<SrbRecord> {
        let lock = self.lock_existing(id)?;
        let _guard = lock.lock().await;
        let result = self
            .mutate(|table| {
                let record = table.get_mut(&id).ok_or(StoreError::NotFound(id))?;
                if let Some(expected) = patch.expected_version {
                    if expected != record.version {
                        return Err(StoreError::StaleVersion {
                            id,
                            expected,
                            actual: record.version,
                        });
                    }
                }
                record.apply_patch(patch, Utc::now())?;
                Ok(record.clone())
            })
            .await;
        let updated = self.release_missing(id, result)?;
        tracing::debug!(id = %id, version = updated.version, "updated SRB record");
        Ok(updated)
    }

    async fn complete(&self, id: RecordId) -> StoreResult<SrbRecord> {
        let lock = self.lock_existing(id)?;
        let _guard = lock.lock().await;
        let validator = self.validator;
        let result = self
            .mutate(|table| {
                let record = table.get_mut(&id).ok_or(StoreError::NotFound(id))?;
                if !record.status.is_open() {
                    return Err(RecordError::Terminal(id.0).into());
                }
                validator.check_record(record)?;
                record.mark_completed(Utc::now());
                Ok(record.clone())
            })
            .await;
        let result = self.release_missing(id, result);
        match &result {
            Ok(record) => tracing::info!(id = %id, code = %record.code(), "SRB record completed"),
            Err(e) => tracing::warn!(id = %id, error = %e, "SRB completion rejected"),
        }
        result
    }

    async fn get(&self, id: RecordId) -> StoreResult<Option<SrbRecord>> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn find_by_safety_plan(&self, plan: SafetyPlanId) -> StoreResult<Option<SrbRecord>> {
        Ok(self
            .records
            .read()
            .values()
            .rev()
            .find(|r| r.safety_plan_id == plan)
            .cloned())
    }

    async fn list(&self, query: &ListQuery) -> StoreResult<Page<SrbRecord>> {
        Ok(query.paginate(self.records.read().values().rev()))
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        let Ok(lock) = self.lock_existing(id) else {
            return Ok(false);
        };
        let _guard = lock.lock().await;
        let removed = self.mutate(|table| Ok(table.remove(&id).is_some())).await?;
        self.locks.forget(id);
        if removed {
            tracing::info!(id = %id, "deleted SRB record");
        }
        Ok(removed)
    }
}
