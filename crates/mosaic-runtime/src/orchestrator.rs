//! Orchestrator: one service instance's shared state and RPC verbs.

use std::sync::Arc;

use tracing::info;

use mosaic_core::{MosaicConfig, Result};
use mosaic_metrics::{LatencyReport, MetricsAggregator, RetentionPolicy};
use mosaic_registry::{NodeRegistry, SpawnCoordinator};

use crate::dispatcher::FractalDispatcher;
use crate::strategy::StrategyRegistry;
use crate::types::*;

/// Top-level context that owns the node tree and the metric log.
pub struct NetworkOrchestrator {
    registry: Arc<NodeRegistry>,
    metrics: Arc<MetricsAggregator>,
    strategies: Arc<StrategyRegistry>,
    coordinator: SpawnCoordinator,
    dispatcher: FractalDispatcher,
}

impl NetworkOrchestrator {
    /// Create an orchestrator running the simulated strategy everywhere.
    pub fn new(config: &MosaicConfig) -> Self {
        Self::with_strategies(config, StrategyRegistry::default())
    }

    /// Create an orchestrator with an explicit strategy table.
    pub fn with_strategies(config: &MosaicConfig, strategies: StrategyRegistry) -> Self {
        let registry = Arc::new(NodeRegistry::new(config.max_nodes));
        let metrics = Arc::new(MetricsAggregator::new(RetentionPolicy {
            max_age: config.retention,
            max_samples: config.max_samples,
        }));
        let strategies = Arc::new(strategies);
        let coordinator = SpawnCoordinator::new(registry.clone());
        let dispatcher = FractalDispatcher::new(
            registry.clone(),
            metrics.clone(),
            strategies.clone(),
            config.dispatch_timeout,
        );

        info!(
            "Orchestrator initialized: max_nodes={}, retention={}s/{} samples, dispatch_timeout={}s",
            config.max_nodes,
            config.retention.as_secs(),
            config.max_samples,
            config.dispatch_timeout.as_secs()
        );

        Self {
            registry,
            metrics,
            strategies,
            coordinator,
            dispatcher,
        }
    }

    /// RPC: SpawnNode.
    pub fn spawn_node(&self, request: &SpawnRequest) -> SpawnResponse {
        self.coordinator
            .spawn_node(&request.parent_node_id, request.target_dimension)
    }

    /// RPC: ProcessFractal.
    pub async fn process_fractal(&self, request: FractalRequest) -> FractalResponse {
        self.dispatcher.process_fractal(request).await
    }

    /// RPC: GetMetrics.
    pub fn get_metrics(&self, request: &MetricsRequest) -> MetricsResponse {
        MetricsResponse {
            metrics: self.metrics.query(
                &request.node_ids,
                request.start_timestamp,
                request.end_timestamp,
            ),
        }
    }

    /// Seed the canonical network up to `max_dimension`.
    pub fn bootstrap(&self, max_dimension: i32) -> Result<Vec<String>> {
        self.coordinator.bootstrap(max_dimension)
    }

    pub fn latency_report(&self) -> LatencyReport {
        self.metrics.latency_report()
    }

    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            node_count: self.registry.len(),
            sample_count: self.metrics.sample_count(),
            tracked_nodes: self.metrics.known_nodes().len(),
            strategies: self.strategies.names(),
        }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> &Arc<MetricsAggregator> {
        &self.metrics
    }

    pub fn strategies(&self) -> &Arc<StrategyRegistry> {
        &self.strategies
    }
}
