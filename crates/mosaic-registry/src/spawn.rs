//! Spawn coordinator: grows the fractal tree on request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use mosaic_core::{Error, Result, MAX_DIMENSION, MIN_DIMENSION};

use crate::registry::NodeRegistry;

/// Outcome of a spawn request. Failures are data, not faults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnResponse {
    pub new_node_id: String,
    pub success: bool,
    pub error_message: String,
}

impl SpawnResponse {
    fn ok(new_node_id: String) -> Self {
        Self {
            new_node_id,
            success: true,
            error_message: String::new(),
        }
    }

    fn failed(err: &Error) -> Self {
        Self {
            new_node_id: String::new(),
            success: false,
            error_message: format!("{}: {}", err.kind(), err),
        }
    }
}

/// Validates spawn requests and delegates to the registry.
pub struct SpawnCoordinator {
    registry: Arc<NodeRegistry>,
}

impl SpawnCoordinator {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// Spawn a node under `parent_node_id` (empty for a new root).
    pub fn spawn_node(&self, parent_node_id: &str, target_dimension: i32) -> SpawnResponse {
        let operation_id = Uuid::new_v4();
        debug!(
            "BEGIN spawn_node operation_id={} parent_id={:?} dimension={}",
            operation_id, parent_node_id, target_dimension
        );

        let parent = (!parent_node_id.is_empty()).then_some(parent_node_id);
        match self.registry.register(parent, target_dimension) {
            Ok(node) => {
                info!(
                    "Spawned node {} (dimension={}, parent={:?})",
                    node.id, node.dimension, node.parent_id
                );
                debug!("END spawn_node operation_id={} node_id={}", operation_id, node.id);
                SpawnResponse::ok(node.id)
            }
            Err(e) => {
                warn!(
                    "Spawn rejected operation_id={} parent_id={:?} dimension={}: {}",
                    operation_id, parent_node_id, target_dimension, e
                );
                SpawnResponse::failed(&e)
            }
        }
    }

    /// Seed the canonical network up to `max_dimension`.
    ///
    /// Dimensions 1–9 get two nodes each, higher dimensions one. Every node
    /// above dimension 1 hangs off `dim_<d-1>_node_0`.
    pub fn bootstrap(&self, max_dimension: i32) -> Result<Vec<String>> {
        let max_dimension = max_dimension.clamp(MIN_DIMENSION, MAX_DIMENSION);
        info!("Bootstrapping network up to dimension {}", max_dimension);

        let mut created = Vec::new();
        for dim in MIN_DIMENSION..=max_dimension {
            let per_dimension = if dim <= 9 { 2 } else { 1 };
            let parent = (dim > MIN_DIMENSION).then(|| bootstrap_id(dim - 1, 0));
            for i in 0..per_dimension {
                let id = bootstrap_id(dim, i);
                self.registry
                    .register_named(&id, parent.as_deref(), dim)?;
                created.push(id);
            }
        }

        info!("Bootstrap complete: {} nodes", created.len());
        Ok(created)
    }
}

fn bootstrap_id(dimension: i32, index: usize) -> String {
    format!("dim_{}_node_{}", dimension, index)
}
