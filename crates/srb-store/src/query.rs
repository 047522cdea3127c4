//! Record browser queries

use serde::{Deserialize, Serialize};
use srb_model::{RecordStatus, SafetyPlanId, SrbRecord};

/// Filter and window for record listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_plan_id: Option<SafetyPlanId>,
    pub offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Everything, newest first
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Only records in a status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Only records for a plan
    #[inline]
    #[must_use]
    pub fn with_safety_plan(mut self, plan: SafetyPlanId) -> Self {
        self.safety_plan_id = Some(plan);
        self
    }

    /// Window
    #[inline]
    #[must_use]
    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    /// Whether a record passes the filters
    #[must_use]
    pub fn matches(&self, record: &SrbRecord) -> bool {
        self.status.map_or(true, |s| record.status == s)
            && self.safety_plan_id.map_or(true, |p| record.safety_plan_id == p)
    }

    /// Apply filters and window to records already sorted newest first
    pub fn paginate<'a>(&self, records: impl Iterator<Item = &'a SrbRecord>) -> Page<SrbRecord> {
        let matching: Vec<&SrbRecord> = records.filter(|r| self.matches(r)).collect();
        let total = matching.len();
        let limit = self.limit.unwrap_or(total);
        let items = matching
            .into_iter()
            .skip(self.offset)
            .take(limit)
            .cloned()
            .collect();
        Page {
            items,
            total,
            offset: self.offset,
            limit,
        }
    }
}

/// One window of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matching records before windowing
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

impl<T> Page<T> {
    /// More matching records after this window
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }
}
