//! REST API over a finished simulation run.
//!
//! Provides two GET endpoints:
//! - `/summary`: run totals and the last emitted row
//! - `/rows`: emitted rows with optional timestamp range filtering

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::sim::summary::SimulationSummary;
use crate::sim::types::OutputRow;

/// Read-only state shared across all request handlers.
pub struct AppState {
    /// Preset name or scenario path the run was configured from.
    pub scenario: String,
    pub summary: SimulationSummary,
    /// Emitted rows, in timestamp order.
    pub rows: Vec<OutputRow>,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/rows", get(handlers::get_rows))
        .with_state(state)
}

/// Binds to `addr` and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if binding or serving fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
