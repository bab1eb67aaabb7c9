//! End-to-end network demonstration.
//!
//! Seeds the canonical 27-dimension network, fires a batch of requests at
//! every node, and judges the result against the per-band TCPR targets.

use std::collections::HashMap;

use futures::future::join_all;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use mosaic_core::{DimensionBand, Result, MAX_DIMENSION};
use mosaic_metrics::LatencyReport;

use crate::orchestrator::NetworkOrchestrator;
use crate::types::FractalRequest;

/// Minimum overall success rate for a passing demo.
pub const DEMO_MIN_SUCCESS_RATE: f64 = 0.95;

#[derive(Debug, Clone, Copy)]
pub struct DemoOptions {
    /// Requests per node for dimensions 1–9.
    pub primary_requests: usize,
    /// Requests per node for dimensions 10–27.
    pub extended_requests: usize,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            primary_requests: 5,
            extended_requests: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub demo_id: String,
    pub total_nodes: usize,
    pub total_requests: usize,
    pub latency: LatencyReport,
    pub success: bool,
}

/// Run the demonstration against `orchestrator`.
///
/// Bootstraps the network unless it is already present.
pub async fn run_demo(orchestrator: &NetworkOrchestrator, options: DemoOptions) -> Result<DemoReport> {
    let demo_id = Uuid::new_v4().to_string();
    info!("BEGIN run_demo demo_id={}", demo_id);

    if !orchestrator.registry().contains("dim_1_node_0") {
        orchestrator.bootstrap(MAX_DIMENSION)?;
    }

    let nodes = orchestrator.registry().list();
    let mut requests = Vec::new();
    for node in &nodes {
        let count = match node.dimension.band() {
            DimensionBand::Primary => options.primary_requests,
            DimensionBand::Extended => options.extended_requests,
        };
        for i in 0..count {
            let mut metadata = HashMap::new();
            metadata.insert(
                "test_id".to_string(),
                format!("dim_{}_req_{}", node.dimension, i),
            );
            metadata.insert("demo_id".to_string(), demo_id.clone());
            requests.push(FractalRequest {
                node_id: node.id.clone(),
                payload: Vec::new(),
                metadata,
                timeout_ms: None,
            });
        }
    }

    let total_requests = requests.len();
    join_all(
        requests
            .into_iter()
            .map(|req| orchestrator.process_fractal(req)),
    )
    .await;

    let latency = orchestrator.latency_report();
    let success = latency.meets_targets() && latency.overall_success_rate >= DEMO_MIN_SUCCESS_RATE;

    info!(
        "END run_demo demo_id={} requests={} success={}",
        demo_id, total_requests, success
    );

    Ok(DemoReport {
        demo_id,
        total_nodes: nodes.len(),
        total_requests,
        latency,
        success,
    })
}
