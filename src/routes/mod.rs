//! HTTP route handlers for the MountWald API.
//!
//! - `drives`: mount listing and path-to-mount lookup
//! - `health`: health check, metrics and version endpoints

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod drives;
pub mod health;

/// Builds the application router on top of `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/metrics", get(health::metrics))
        .route("/metrics/prometheus", get(health::metrics_prometheus))
        .route("/version", get(health::version))
        .route("/drives", get(drives::list_drives))
        .route("/drives/lookup", get(drives::lookup_drive))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
