//! Health and latency report routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use mosaic_metrics::LatencyReport;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(get_health))
        .route("/metrics/latency-report", get(get_latency_report))
}

/// GET /api/health: liveness plus instance counters.
async fn get_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let status = state.orchestrator.status();
    let uptime = (chrono::Utc::now() - state.started_at).num_seconds();

    Json(serde_json::json!({
        "status": "healthy",
        "service": "mosaic",
        "nodes": status.node_count,
        "samples": status.sample_count,
        "trackedNodes": status.tracked_nodes,
        "strategies": status.strategies,
        "uptimeSeconds": uptime,
        "port": state.config.port,
    }))
}

/// GET /api/metrics/latency-report: per-band TCPR summary.
async fn get_latency_report(State(state): State<Arc<AppState>>) -> Json<LatencyReport> {
    Json(state.orchestrator.latency_report())
}
