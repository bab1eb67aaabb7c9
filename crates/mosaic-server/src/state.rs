//! Shared application state.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use mosaic_core::MosaicConfig;
use mosaic_runtime::{NetworkOrchestrator, StrategyRegistry};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: MosaicConfig,
    pub orchestrator: NetworkOrchestrator,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build state with the default strategy table, bootstrapping the
    /// network when configured to.
    pub fn new(config: MosaicConfig) -> Self {
        Self::with_strategies(config, StrategyRegistry::default())
    }

    pub fn with_strategies(config: MosaicConfig, strategies: StrategyRegistry) -> Self {
        let orchestrator = NetworkOrchestrator::with_strategies(&config, strategies);

        if let Some(max_dimension) = config.bootstrap_dimension {
            match orchestrator.bootstrap(max_dimension) {
                Ok(ids) => info!("Seeded {} nodes", ids.len()),
                Err(e) => warn!("Bootstrap failed: {}", e),
            }
        }

        Self {
            config,
            orchestrator,
            started_at: Utc::now(),
        }
    }
}
