//! Latency report grouped by dimension band.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use mosaic_core::{DimensionBand, MetricSample};

/// Summary of one dimension band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandReport {
    pub band: DimensionBand,
    /// Human label such as `dim_1_9`.
    pub label: String,
    pub node_count: usize,
    pub request_count: usize,
    /// Mean of per-node mean TCPR.
    pub avg_tcpr: f64,
    /// Worst per-node mean TCPR.
    pub max_tcpr: f64,
    pub target_tcpr: f64,
    /// Every node's mean TCPR is within the target.
    pub meets_target: bool,
}

/// Latency report over the retained sample window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyReport {
    pub generated_at: DateTime<Utc>,
    pub bands: Vec<BandReport>,
    pub total_requests: usize,
    pub overall_success_rate: f64,
}

impl LatencyReport {
    /// Build a report from raw samples. Samples for unknown nodes
    /// (dimension 0) count toward totals but belong to no band.
    pub fn from_samples<'a>(samples: impl Iterator<Item = &'a MetricSample>) -> Self {
        // node_id -> (dimension, total_tcpr, count)
        let mut per_node: BTreeMap<&str, (i32, f64, usize)> = BTreeMap::new();
        let mut total_requests = 0usize;
        let mut successes = 0usize;

        for sample in samples {
            total_requests += 1;
            if sample.success {
                successes += 1;
            }
            let entry = per_node
                .entry(sample.node_id.as_str())
                .or_insert((sample.dimension, 0.0, 0));
            entry.0 = sample.dimension;
            entry.1 += sample.tcpr_seconds;
            entry.2 += 1;
        }

        let bands = DimensionBand::all()
            .into_iter()
            .map(|band| {
                let means: Vec<(f64, usize)> = per_node
                    .values()
                    .filter(|(dim, _, _)| DimensionBand::for_dimension(*dim) == Some(band))
                    .map(|(_, total, count)| (total / *count as f64, *count))
                    .collect();
                let node_count = means.len();
                let request_count = means.iter().map(|(_, c)| c).sum();
                let avg_tcpr = if node_count > 0 {
                    means.iter().map(|(m, _)| m).sum::<f64>() / node_count as f64
                } else {
                    0.0
                };
                let max_tcpr = means.iter().map(|(m, _)| *m).fold(0.0, f64::max);
                let target_tcpr = band.target_tcpr();
                BandReport {
                    band,
                    label: band.to_string(),
                    node_count,
                    request_count,
                    avg_tcpr,
                    max_tcpr,
                    target_tcpr,
                    meets_target: means.iter().all(|(m, _)| *m <= target_tcpr),
                }
            })
            .collect();

        let overall_success_rate = if total_requests > 0 {
            successes as f64 / total_requests as f64
        } else {
            0.0
        };

        Self {
            generated_at: Utc::now(),
            bands,
            total_requests,
            overall_success_rate,
        }
    }

    pub fn band(&self, band: DimensionBand) -> Option<&BandReport> {
        self.bands.iter().find(|b| b.band == band)
    }

    /// All bands within target.
    pub fn meets_targets(&self) -> bool {
        self.bands.iter().all(|b| b.meets_target)
    }
}
