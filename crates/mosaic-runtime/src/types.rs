//! RPC message types.
//!
//! Field names follow the `mojomosaic.NetworkOrchestrator` service so JSON
//! bodies read the same as the protobuf messages. Missing fields take their
//! zero value, as proto3 would.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use mosaic_core::NodeMetric;

pub use mosaic_registry::SpawnResponse;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnRequest {
    /// Empty spawns a new root.
    pub parent_node_id: String,
    pub target_dimension: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalRequest {
    pub node_id: String,
    pub payload: Vec<u8>,
    pub metadata: HashMap<String, String>,
    /// Per-call timeout; the configured default applies when absent or zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FractalResponse {
    pub node_id: String,
    pub result: Vec<u8>,
    pub tcpr_seconds: f64,
    pub success: bool,
    /// Empty on success.
    pub error_message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsRequest {
    /// Empty means every node with samples.
    pub node_ids: Vec<String>,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub metrics: Vec<NodeMetric>,
}

/// Instance-level counters.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    pub node_count: usize,
    pub sample_count: usize,
    pub tracked_nodes: usize,
    pub strategies: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_default_missing_fields() {
        let req: SpawnRequest = serde_json::from_str(r#"{"target_dimension": 3}"#).unwrap();
        assert_eq!(req.parent_node_id, "");
        assert_eq!(req.target_dimension, 3);

        let req: FractalRequest = serde_json::from_str(r#"{"node_id": "a"}"#).unwrap();
        assert!(req.payload.is_empty());
        assert!(req.metadata.is_empty());
        assert!(req.timeout_ms.is_none());

        let req: MetricsRequest = serde_json::from_str("{}").unwrap();
        assert!(req.node_ids.is_empty());
        assert_eq!(req.end_timestamp, 0);
    }

    #[test]
    fn test_fractal_response_shape() {
        let resp = FractalResponse {
            node_id: "a".into(),
            result: vec![1, 2],
            tcpr_seconds: 0.5,
            success: true,
            error_message: String::new(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["result"], serde_json::json!([1, 2]));
        assert!(json["tcpr_seconds"].is_number());
        assert!(json["success"].is_boolean());
    }
}
