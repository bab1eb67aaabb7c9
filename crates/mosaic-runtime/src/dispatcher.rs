//! Fractal dispatcher: runs work on a node and measures TCPR.
//!
//! Every call produces exactly one `MetricSample`, whatever the outcome.
//! Strategy errors, panics, and timeouts are contained here and reported
//! in-band; they never escape to the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};
use uuid::Uuid;

use mosaic_core::{Error, MetricSample, Node};
use mosaic_metrics::MetricsAggregator;
use mosaic_registry::NodeRegistry;

use crate::strategy::{FractalStrategy, FractalTask, StrategyRegistry};
use crate::types::{FractalRequest, FractalResponse};

pub struct FractalDispatcher {
    registry: Arc<NodeRegistry>,
    metrics: Arc<MetricsAggregator>,
    strategies: Arc<StrategyRegistry>,
    default_timeout: Duration,
}

impl FractalDispatcher {
    pub fn new(
        registry: Arc<NodeRegistry>,
        metrics: Arc<MetricsAggregator>,
        strategies: Arc<StrategyRegistry>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            metrics,
            strategies,
            default_timeout,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Execute one `ProcessFractal` call.
    pub async fn process_fractal(&self, request: FractalRequest) -> FractalResponse {
        let operation_id = Uuid::new_v4();
        let started = Instant::now();
        let FractalRequest {
            node_id,
            payload,
            metadata,
            timeout_ms,
        } = request;

        debug!(
            "BEGIN process_fractal operation_id={} node_id={} payload_len={}",
            operation_id,
            node_id,
            payload.len()
        );

        let node = match self.registry.lookup(&node_id) {
            Ok(node) => node,
            Err(e) => {
                let tcpr = started.elapsed().as_secs_f64();
                warn!("Dispatch to unknown node operation_id={}: {}", operation_id, e);
                self.metrics.record(MetricSample::now(&node_id, 0, tcpr, false));
                return failed(node_id, tcpr, &e);
            }
        };

        let timeout = timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(self.default_timeout);

        // Detached from this future: a dropped caller still gets a sample
        // recorded and the strategy aborted at its deadline.
        let supervised = tokio::spawn(supervise(
            self.metrics.clone(),
            self.strategies.resolve(node.dimension),
            FractalTask {
                node,
                payload,
                metadata,
            },
            timeout,
            started,
            operation_id,
        ));

        match supervised.await {
            Ok(response) => response,
            Err(join_err) => {
                let tcpr = started.elapsed().as_secs_f64();
                error!(
                    "Supervisor failed operation_id={} node_id={}: {}",
                    operation_id, node_id, join_err
                );
                failed(node_id, tcpr, &Error::Internal(join_err.to_string()))
            }
        }
    }
}

/// Run one task to completion or deadline, record its sample, and build
/// the response.
async fn supervise(
    metrics: Arc<MetricsAggregator>,
    strategy: Arc<dyn FractalStrategy>,
    task: FractalTask,
    timeout: Duration,
    started: Instant,
    operation_id: Uuid,
) -> FractalResponse {
    let node = task.node.clone();
    let outcome = run_bounded(strategy, task, timeout).await;
    let tcpr = started.elapsed().as_secs_f64();

    metrics.record(MetricSample::now(
        &node.id,
        node.dimension.get(),
        tcpr,
        outcome.is_ok(),
    ));

    match outcome {
        Ok(result) => {
            check_sla(&node, tcpr);
            debug!(
                "END process_fractal operation_id={} tcpr={:.3}s status=success",
                operation_id, tcpr
            );
            FractalResponse {
                node_id: node.id,
                result,
                tcpr_seconds: tcpr,
                success: true,
                error_message: String::new(),
            }
        }
        Err(e) => {
            error!(
                "END process_fractal operation_id={} node_id={} tcpr={:.3}s status=error: {}",
                operation_id, node.id, tcpr, e
            );
            failed(node.id, tcpr, &e)
        }
    }
}

async fn run_bounded(
    strategy: Arc<dyn FractalStrategy>,
    task: FractalTask,
    timeout: Duration,
) -> mosaic_core::Result<Vec<u8>> {
    let mut handle = tokio::spawn(async move { strategy.compute(task).await });

    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(Ok(result))) => Ok(result),
        Ok(Ok(Err(Error::ComputationFailure(msg)))) => Err(Error::ComputationFailure(msg)),
        Ok(Ok(Err(e))) => Err(Error::ComputationFailure(e.to_string())),
        Ok(Err(join_err)) => Err(Error::ComputationFailure(if join_err.is_panic() {
            "strategy panicked".to_string()
        } else {
            "strategy cancelled".to_string()
        })),
        Err(_) => {
            handle.abort();
            Err(Error::ComputationFailure(format!(
                "timed out after {}ms",
                timeout.as_millis()
            )))
        }
    }
}

fn failed(node_id: String, tcpr: f64, err: &Error) -> FractalResponse {
    FractalResponse {
        node_id,
        result: Vec::new(),
        tcpr_seconds: tcpr,
        success: false,
        error_message: format!("{}: {}", err.kind(), err),
    }
}

/// SLA targets are observed, never enforced.
fn check_sla(node: &Node, tcpr: f64) {
    let band = node.dimension.band();
    if tcpr > band.target_tcpr() {
        warn!(
            "TCPR SLA breach on {} (dimension={}): {:.3}s > {:.1}s",
            node.id,
            node.dimension,
            tcpr,
            band.target_tcpr()
        );
    }
}
