//! Per-dimension fractal computations.
//!
//! The orchestrator does not know what a fractal computation is. It looks up
//! a `FractalStrategy` for the node's dimension and runs it. Strategies may
//! await freely; the dispatcher bounds them with a timeout.

use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use mosaic_core::{Dimension, Node, Result};

/// One unit of dispatched work.
#[derive(Debug, Clone)]
pub struct FractalTask {
    pub node: Node,
    pub payload: Vec<u8>,
    pub metadata: HashMap<String, String>,
}

/// A computation run on behalf of a node.
#[async_trait]
pub trait FractalStrategy: Send + Sync {
    /// Short name for logs and status output.
    fn name(&self) -> &str;

    /// Run the computation and return the result payload.
    async fn compute(&self, task: FractalTask) -> Result<Vec<u8>>;
}

/// Simulated work whose duration grows with dimension.
///
/// Sleeps `base + per_dimension * dimension` and returns a JSON descriptor
/// of what was processed.
pub struct SimulatedStrategy {
    base: Duration,
    per_dimension: Duration,
}

impl SimulatedStrategy {
    /// 50ms plus 10ms per dimension.
    pub fn new() -> Self {
        Self::with_timing(Duration::from_millis(50), Duration::from_millis(10))
    }

    pub fn with_timing(base: Duration, per_dimension: Duration) -> Self {
        Self {
            base,
            per_dimension,
        }
    }

    /// Same delay at every dimension.
    pub fn fixed(delay: Duration) -> Self {
        Self::with_timing(delay, Duration::ZERO)
    }

    pub fn delay_for(&self, dimension: Dimension) -> Duration {
        self.base + self.per_dimension * dimension.get() as u32
    }
}

impl Default for SimulatedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FractalStrategy for SimulatedStrategy {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn compute(&self, task: FractalTask) -> Result<Vec<u8>> {
        tokio::time::sleep(self.delay_for(task.node.dimension)).await;

        let metadata: BTreeMap<String, String> = task.metadata.into_iter().collect();
        let descriptor = serde_json::json!({
            "node_id": task.node.id,
            "dimension": task.node.dimension,
            "parent_id": task.node.parent_id,
            "processed_at": Utc::now().to_rfc3339(),
            "payload_len": task.payload.len(),
            "metadata": metadata,
        });
        Ok(serde_json::to_vec(&descriptor)?)
    }
}

/// Returns the payload untouched. Deterministic placeholder.
#[derive(Default)]
pub struct EchoStrategy;

#[async_trait]
impl FractalStrategy for EchoStrategy {
    fn name(&self) -> &str {
        "echo"
    }

    async fn compute(&self, task: FractalTask) -> Result<Vec<u8>> {
        Ok(task.payload)
    }
}

/// Dimension → strategy mapping with a fallback.
pub struct StrategyRegistry {
    by_dimension: RwLock<HashMap<Dimension, Arc<dyn FractalStrategy>>>,
    fallback: Arc<dyn FractalStrategy>,
}

impl StrategyRegistry {
    pub fn new(fallback: Arc<dyn FractalStrategy>) -> Self {
        Self {
            by_dimension: RwLock::new(HashMap::new()),
            fallback,
        }
    }

    /// Route one dimension to `strategy`, replacing any previous mapping.
    pub fn register(&self, dimension: Dimension, strategy: Arc<dyn FractalStrategy>) {
        self.by_dimension.write().insert(dimension, strategy);
    }

    /// Route every valid dimension in `range` to `strategy`.
    pub fn register_range(&self, range: RangeInclusive<i32>, strategy: Arc<dyn FractalStrategy>) {
        let mut map = self.by_dimension.write();
        for dim in range.filter_map(|d| Dimension::new(d).ok()) {
            map.insert(dim, strategy.clone());
        }
    }

    /// Strategy for `dimension`, or the fallback.
    pub fn resolve(&self, dimension: Dimension) -> Arc<dyn FractalStrategy> {
        self.by_dimension
            .read()
            .get(&dimension)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Distinct strategy names in use, fallback first.
    pub fn names(&self) -> Vec<String> {
        let mut names = vec![self.fallback.name().to_string()];
        let map = self.by_dimension.read();
        let mut dims: Vec<&Dimension> = map.keys().collect();
        dims.sort();
        for dim in dims {
            let name = map[dim].name().to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new(Arc::new(SimulatedStrategy::new()))
    }
}
