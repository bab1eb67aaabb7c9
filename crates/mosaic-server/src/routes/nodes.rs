//! Node tree views.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/nodes", get(list_nodes))
        .route("/nodes/{node_id}", get(get_node))
}

/// GET /api/nodes: all nodes in creation order.
async fn list_nodes(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let nodes = state.orchestrator.registry().list();
    Json(serde_json::json!({
        "nodes": nodes,
        "total": nodes.len(),
    }))
}

/// GET /api/nodes/{node_id}: one node with its children.
async fn get_node(
    State(state): State<Arc<AppState>>,
    Path(node_id): Path<String>,
) -> impl IntoResponse {
    match state.orchestrator.registry().view(&node_id) {
        Ok(view) => (StatusCode::OK, Json(serde_json::json!(view))),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}
