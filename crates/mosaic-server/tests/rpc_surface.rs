//! RPC surface tests: drive the router in-process and check the JSON
//! shapes and in-band failure semantics of every route.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use mosaic_core::MosaicConfig;
use mosaic_runtime::{EchoStrategy, SimulatedStrategy, StrategyRegistry};
use mosaic_server::{build_router, AppState};

fn app_with(config: MosaicConfig, strategies: StrategyRegistry) -> Router {
    build_router(Arc::new(AppState::with_strategies(config, strategies)))
}

fn echo_app() -> Router {
    app_with(
        MosaicConfig::default(),
        StrategyRegistry::new(Arc::new(EchoStrategy)),
    )
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn spawn(app: &Router, parent: &str, dimension: i32) -> Value {
    let (status, body) = call(
        app,
        "POST",
        "/rpc/SpawnNode",
        Some(json!({ "parent_node_id": parent, "target_dimension": dimension })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn test_spawn_scenario_over_rpc() {
    let app = echo_app();

    let a = spawn(&app, "", 1).await;
    assert_eq!(a["success"], true);
    assert_eq!(a["error_message"], "");
    let a_id = a["new_node_id"].as_str().unwrap().to_string();

    let b = spawn(&app, &a_id, 2).await;
    assert_eq!(b["success"], true);
    let b_id = b["new_node_id"].as_str().unwrap().to_string();

    let rejected = spawn(&app, &b_id, 2).await;
    assert_eq!(rejected["success"], false);
    assert_eq!(rejected["new_node_id"], "");
    assert!(rejected["error_message"]
        .as_str()
        .unwrap()
        .starts_with("DimensionOutOfRange"));

    let c = spawn(&app, &b_id, 3).await;
    assert_eq!(c["success"], true);

    let (_, nodes) = call(&app, "GET", "/api/nodes", None).await;
    assert_eq!(nodes["total"], 3);
}

#[tokio::test]
async fn test_spawn_rejections_create_nothing() {
    let app = echo_app();
    for dim in [0, 28] {
        let resp = spawn(&app, "", dim).await;
        assert_eq!(resp["success"], false);
    }
    let unknown = spawn(&app, "no-such-parent", 5).await;
    assert_eq!(unknown["success"], false);
    assert!(unknown["error_message"]
        .as_str()
        .unwrap()
        .starts_with("InvalidParent"));

    let (_, nodes) = call(&app, "GET", "/api/nodes", None).await;
    assert_eq!(nodes["total"], 0);
}

#[tokio::test]
async fn test_process_fractal_and_metrics() {
    let app = echo_app();
    let a = spawn(&app, "", 4).await;
    let a_id = a["new_node_id"].as_str().unwrap();

    let (status, resp) = call(
        &app,
        "POST",
        "/rpc/ProcessFractal",
        Some(json!({
            "node_id": a_id,
            "payload": [1, 2, 3],
            "metadata": { "source": "test" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["success"], true);
    assert_eq!(resp["node_id"], a_id);
    assert_eq!(resp["result"], json!([1, 2, 3]));
    assert!(resp["tcpr_seconds"].as_f64().unwrap() >= 0.0);

    let (_, metrics) = call(
        &app,
        "POST",
        "/rpc/GetMetrics",
        Some(json!({
            "node_ids": [a_id],
            "start_timestamp": 0,
            "end_timestamp": i64::MAX,
        })),
    )
    .await;
    let list = metrics["metrics"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["node_id"], a_id);
    assert_eq!(list[0]["dimension"], 4);
    assert_eq!(list[0]["request_count"], 1);
    assert_eq!(list[0]["success_rate"], 1.0);
    assert!(list[0]["avg_tcpr"].is_number());
}

#[tokio::test]
async fn test_process_unknown_node_is_in_band() {
    let app = echo_app();
    let (status, resp) = call(
        &app,
        "POST",
        "/rpc/ProcessFractal",
        Some(json!({ "node_id": "ghost", "payload": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["success"], false);
    assert_eq!(resp["result"], json!([]));
    assert!(resp["error_message"]
        .as_str()
        .unwrap()
        .starts_with("NodeNotFound"));
}

#[tokio::test]
async fn test_caller_timeout() {
    let app = app_with(
        MosaicConfig::default(),
        StrategyRegistry::new(Arc::new(SimulatedStrategy::fixed(Duration::from_secs(3)))),
    );
    let a = spawn(&app, "", 1).await;
    let (_, resp) = call(
        &app,
        "POST",
        "/rpc/ProcessFractal",
        Some(json!({ "node_id": a["new_node_id"], "timeout_ms": 20 })),
    )
    .await;
    assert_eq!(resp["success"], false);
    assert!(resp["error_message"].as_str().unwrap().contains("timed out"));

    let (_, metrics) = call(&app, "POST", "/rpc/GetMetrics", Some(json!({ "end_timestamp": i64::MAX }))).await;
    assert_eq!(metrics["metrics"][0]["success_rate"], 0.0);
}

#[tokio::test]
async fn test_get_metrics_edge_cases() {
    let app = echo_app();
    let a = spawn(&app, "", 1).await;
    let a_id = a["new_node_id"].as_str().unwrap();

    // No samples yet: absent, not zero.
    let (_, empty) = call(
        &app,
        "POST",
        "/rpc/GetMetrics",
        Some(json!({ "node_ids": [a_id], "start_timestamp": 0, "end_timestamp": i64::MAX })),
    )
    .await;
    assert_eq!(empty["metrics"], json!([]));

    call(
        &app,
        "POST",
        "/rpc/ProcessFractal",
        Some(json!({ "node_id": a_id })),
    )
    .await;

    // Inverted range.
    let (status, inverted) = call(
        &app,
        "POST",
        "/rpc/GetMetrics",
        Some(json!({ "node_ids": [a_id], "start_timestamp": 100, "end_timestamp": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inverted["metrics"], json!([]));

    // Identical queries give identical bytes.
    let query = json!({ "start_timestamp": 0, "end_timestamp": i64::MAX });
    let (_, first) = call(&app, "POST", "/rpc/GetMetrics", Some(query.clone())).await;
    let (_, second) = call(&app, "POST", "/rpc/GetMetrics", Some(query)).await;
    assert_eq!(first.to_string(), second.to_string());
}

#[tokio::test]
async fn test_concurrent_rpc_dispatch() {
    let app = echo_app();
    let mut ids = Vec::new();
    for dim in [1, 2, 3] {
        let s = spawn(&app, "", dim).await;
        ids.push(s["new_node_id"].as_str().unwrap().to_string());
    }

    let n = 60;
    let calls = (0..n).map(|i| {
        let app = app.clone();
        let id = ids[i % ids.len()].clone();
        async move {
            let (_, resp) = call(
                &app,
                "POST",
                "/rpc/ProcessFractal",
                Some(json!({ "node_id": id, "payload": [i as u8] })),
            )
            .await;
            resp["success"].as_bool().unwrap()
        }
    });
    let results = futures::future::join_all(calls).await;
    assert!(results.into_iter().all(|ok| ok));

    let (_, metrics) = call(
        &app,
        "POST",
        "/rpc/GetMetrics",
        Some(json!({ "node_ids": ids, "start_timestamp": 0, "end_timestamp": i64::MAX })),
    )
    .await;
    let total: i64 = metrics["metrics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["request_count"].as_i64().unwrap())
        .sum();
    assert_eq!(total, n as i64);
}

#[tokio::test]
async fn test_bootstrap_config_and_node_view() {
    let config = MosaicConfig {
        bootstrap_dimension: Some(10),
        ..MosaicConfig::default()
    };
    let app = app_with(config, StrategyRegistry::new(Arc::new(EchoStrategy)));

    let (_, nodes) = call(&app, "GET", "/api/nodes", None).await;
    // 9 primary dimensions x 2 + dimension 10
    assert_eq!(nodes["total"], 19);

    let (status, node) = call(&app, "GET", "/api/nodes/dim_9_node_0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(node["dimension"], 9);
    assert_eq!(node["parent_id"], "dim_8_node_0");
    assert_eq!(node["children"], json!(["dim_10_node_0"]));

    let (status, missing) = call(&app, "GET", "/api/nodes/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(missing["error"].is_string());
}

#[tokio::test]
async fn test_health_and_latency_report() {
    let app = echo_app();
    let a = spawn(&app, "", 12).await;
    call(
        &app,
        "POST",
        "/rpc/ProcessFractal",
        Some(json!({ "node_id": a["new_node_id"] })),
    )
    .await;

    let (status, health) = call(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["nodes"], 1);
    assert_eq!(health["samples"], 1);

    let (_, report) = call(&app, "GET", "/api/metrics/latency-report", None).await;
    assert_eq!(report["total_requests"], 1);
    let bands = report["bands"].as_array().unwrap();
    assert_eq!(bands.len(), 2);
    assert_eq!(bands[0]["band"], "primary");
    assert_eq!(bands[0]["node_count"], 0);
    assert_eq!(bands[1]["band"], "extended");
    assert_eq!(bands[1]["node_count"], 1);
    assert_eq!(bands[1]["target_tcpr"], 10.0);
}
