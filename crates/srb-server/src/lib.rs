//! SRB Server
//!
//! REST service for Safety Review Board records:
//! - [`router`]: axum routes over any [`RecordStore`](srb_store::RecordStore)
//! - [`ServerConfig`]: TOML + environment + CLI configuration
//! - [`serve`]: run the router on a bound listener

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod api;
pub mod config;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use api::{ApiError, EscalationRequest, EscalationResponse, HealthResponse};
pub use config::{ConfigError, LogFormat, ServerConfig};
pub use routes::{router, REQUEST_ID_HEADER};
pub use state::AppState;

use tokio::net::TcpListener;

/// Serve the API until the shutdown future resolves
///
/// # Errors
/// Returns the listener's I/O error.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "SRB server listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
