//! NetworkOrchestrator RPCs. Always 200; failures travel in the body.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use mosaic_runtime::{
    FractalRequest, FractalResponse, MetricsRequest, MetricsResponse, SpawnRequest, SpawnResponse,
};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/SpawnNode", post(spawn_node))
        .route("/ProcessFractal", post(process_fractal))
        .route("/GetMetrics", post(get_metrics))
}

/// POST /rpc/SpawnNode
async fn spawn_node(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpawnRequest>,
) -> Json<SpawnResponse> {
    Json(state.orchestrator.spawn_node(&req))
}

/// POST /rpc/ProcessFractal
async fn process_fractal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FractalRequest>,
) -> Json<FractalResponse> {
    Json(state.orchestrator.process_fractal(req).await)
}

/// POST /rpc/GetMetrics
async fn get_metrics(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MetricsRequest>,
) -> Json<MetricsResponse> {
    Json(state.orchestrator.get_metrics(&req))
}
