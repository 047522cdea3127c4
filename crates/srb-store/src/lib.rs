//! SRB Store
//!
//! Persistence collaborator for Safety Review Board records:
//! - [`RecordStore`]: async create/update/complete/read/delete contract
//! - [`InMemoryRecordStore`]: in-process store with per-record write locks and
//!   an optional JSON snapshot file
//! - [`HttpRecordStore`]: the same contract over the REST API (feature `http`)
//!
//! Completion is always re-validated by the store; client-side gating is
//! advisory.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
#[cfg(feature = "http")]
mod http;
mod memory;
mod query;
mod store;

pub use error::{ErrorBody, StoreError, StoreErrorKind, StoreResult};
#[cfg(feature = "http")]
pub use http::HttpRecordStore;
pub use memory::InMemoryRecordStore;
pub use query::{ListQuery, Page};
pub use store::RecordStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
