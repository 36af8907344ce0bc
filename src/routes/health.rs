use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Health check endpoint - lightweight
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Metrics endpoint: returns JSON snapshot
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.get_snapshot();
    Json(snapshot)
}

// Prometheus-compatible text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.metrics.get_snapshot();
    let body = format!(
        "# HELP mountwald_enumerations Mount table enumerations\n# TYPE mountwald_enumerations counter\nmountwald_enumerations {}\n\
# HELP mountwald_mounts_listed Mounts returned across all enumerations\n# TYPE mountwald_mounts_listed counter\nmountwald_mounts_listed {}\n\
# HELP mountwald_lines_skipped Mount table lines skipped as malformed\n# TYPE mountwald_lines_skipped counter\nmountwald_lines_skipped {}\n\
# HELP mountwald_volume_failures Volume queries that failed or timed out\n# TYPE mountwald_volume_failures counter\nmountwald_volume_failures {}\n\
# HELP mountwald_uptime_seconds Uptime seconds\n# TYPE mountwald_uptime_seconds gauge\nmountwald_uptime_seconds {}\n",
        m.enumerations,
        m.mounts_listed,
        m.lines_skipped,
        m.volume_failures,
        m.uptime_seconds,
    );
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

// Version/Build info endpoint (JSON)
pub async fn version() -> impl IntoResponse {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}
