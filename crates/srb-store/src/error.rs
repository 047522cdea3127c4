//! Error types for SRB record stores
//!
//! Every store implementation reports failures through [`StoreError`]; callers
//! that only care about the class of failure use [`StoreError::kind`], which
//! survives a round trip through the HTTP API.

use serde::{Deserialize, Serialize};
use srb_model::{CompletionFailure, RecordError, RecordId, SafetyPlanId};
use std::path::PathBuf;

/// Failure class, stable across process boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorKind {
    /// Record does not exist
    NotFound,
    /// Write conflicts with stored state (duplicate open record, stale version)
    Conflict,
    /// Payload violates record invariants
    Invalid,
    /// Authoritative completion check failed
    CompletionRejected,
    /// Backend could not be reached or failed internally
    Unavailable,
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Record not found
    #[error("SRB record not found: {0}")]
    NotFound(RecordId),

    /// A non-completed record already exists for the plan
    #[error("safety plan {plan} already has an open SRB record ({existing})")]
    DuplicateOpenRecord {
        plan: SafetyPlanId,
        existing: RecordId,
    },

    /// Optimistic concurrency failure
    #[error("record {id} changed concurrently: expected version {expected}, found {actual}")]
    StaleVersion {
        id: RecordId,
        expected: u64,
        actual: u64,
    },

    /// Invalid record payload
    #[error("invalid record: {0}")]
    Invalid(#[from] RecordError),

    /// Completion rules not met
    #[error("{0}")]
    CompletionRejected(#[from] CompletionFailure),

    /// Snapshot file could not be read or written
    #[error("snapshot io error at {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file is not valid JSON
    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Failure reported by a remote store
    #[error("{message}")]
    Remote {
        kind: StoreErrorKind,
        message: String,
    },

    /// Transport failure talking to a remote store
    #[error("store unreachable: {0}")]
    Transport(String),
}

impl StoreError {
    /// Failure class
    #[must_use]
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            Self::NotFound(_) => StoreErrorKind::NotFound,
            Self::DuplicateOpenRecord { .. } | Self::StaleVersion { .. } => StoreErrorKind::Conflict,
            Self::Invalid(_) => StoreErrorKind::Invalid,
            Self::CompletionRejected(_) => StoreErrorKind::CompletionRejected,
            Self::Snapshot { .. } | Self::Encoding(_) | Self::Transport(_) => {
                StoreErrorKind::Unavailable
            }
            Self::Remote { kind, .. } => *kind,
        }
    }

    /// Whether retrying the same call may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind() == StoreErrorKind::Unavailable
    }

    /// Create snapshot io error for path
    pub fn snapshot(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Snapshot {
            path: path.into(),
            source,
        }
    }
}

/// JSON error body exchanged over the REST API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: StoreErrorKind,
}

impl From<&StoreError> for ErrorBody {
    fn from(err: &StoreError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
        }
    }
}

impl From<ErrorBody> for StoreError {
    fn from(body: ErrorBody) -> Self {
        Self::Remote {
            kind: body.kind,
            message: body.error,
        }
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
