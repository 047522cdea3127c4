//! [`RecordStore`] backed by the SRB REST API
//!
//! Lets a workflow session run against a remote `srb-server` exactly as it
//! would against an in-process store. Error bodies carry a
//! [`StoreErrorKind`] so rejections keep their class across the wire.

use crate::error::{ErrorBody, StoreError, StoreErrorKind, StoreResult};
use crate::query::{ListQuery, Page};
use crate::store::RecordStore;
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use srb_model::{NewSrbRecord, RecordId, SafetyPlanId, SrbRecord, SrbRecordPatch};

/// HTTP client store
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRecordStore {
    /// Client for a server root such as `http://127.0.0.1:8080`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing client
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/srb-records{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(transport);
        }
        Err(Self::rejection(status, response).await)
    }

    async fn rejection(status: StatusCode, response: Response) -> StoreError {
        match response.json::<ErrorBody>().await {
            Ok(body) => body.into(),
            Err(_) => StoreError::Remote {
                kind: kind_for_status(status),
                message: format!("server responded {status}"),
            },
        }
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

fn kind_for_status(status: StatusCode) -> StoreErrorKind {
    match status {
        StatusCode::NOT_FOUND => StoreErrorKind::NotFound,
        StatusCode::CONFLICT => StoreErrorKind::Conflict,
        StatusCode::UNPROCESSABLE_ENTITY => StoreErrorKind::Invalid,
        StatusCode::BAD_REQUEST => StoreErrorKind::CompletionRejected,
        _ => StoreErrorKind::Unavailable,
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn create(&self, record: NewSrbRecord) -> StoreResult<SrbRecord> {
        let response = self
            .client
            .post(self.url(""))
            .json(&record)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn update(&self, id: RecordId, patch: SrbRecordPatch) -> StoreResult<SrbRecord> {
        let response = self
            .client
            .patch(self.url(&format!("/{id}")))
            .json(&patch)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn complete(&self, id: RecordId) -> StoreResult<SrbRecord> {
        let response = self
            .client
            .post(self.url(&format!("/{id}/complete")))
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn get(&self, id: RecordId) -> StoreResult<Option<SrbRecord>> {
        let response = self
            .client
            .get(self.url(&format!("/{id}")))
            .send()
            .await
            .map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::decode(response).await.map(Some)
    }

    async fn find_by_safety_plan(&self, plan: SafetyPlanId) -> StoreResult<Option<SrbRecord>> {
        let response = self
            .client
            .get(self.url(&format!("/safety-plan/{plan}")))
            .send()
            .await
            .map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::decode(response).await.map(Some)
    }

    async fn list(&self, query: &ListQuery) -> StoreResult<Page<SrbRecord>> {
        let response = self
            .client
            .get(self.url(""))
            .query(query)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        let response = self
            .client
            .delete(self.url(&format!("/{id}")))
            .send()
            .await
            .map_err(transport)?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(Self::rejection(status, response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_rooted_once() {
        let store = HttpRecordStore::new("http://localhost:8080/");
        assert_eq!(store.url("/3/complete"), "http://localhost:8080/api/srb-records/3/complete");
    }

    #[test]
    fn status_fallback_kinds() {
        assert_eq!(kind_for_status(StatusCode::CONFLICT), StoreErrorKind::Conflict);
        assert_eq!(kind_for_status(StatusCode::BAD_GATEWAY), StoreErrorKind::Unavailable);
    }
}
