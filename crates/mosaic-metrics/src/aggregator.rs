//! Sample log and range queries.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use mosaic_core::{MetricSample, NodeMetric, MIN_DIMENSION};

use crate::report::LatencyReport;

/// Bounds on how much history the aggregator keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Samples older than this, relative to the newest sample, are dropped.
    pub max_age: Duration,
    /// Oldest samples beyond this count are dropped.
    pub max_samples: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(24 * 60 * 60),
            max_samples: 100_000,
        }
    }
}

#[derive(Default)]
struct MetricLog {
    samples: VecDeque<MetricSample>,
    /// Node ids in the order their first retained sample arrived. Samples
    /// for ids that never named a node are stored but not listed.
    discovery: Vec<String>,
    per_node: HashMap<String, usize>,
    newest: Option<DateTime<Utc>>,
}

impl MetricLog {
    fn push(&mut self, sample: MetricSample) {
        if is_listed(&sample) {
            let count = self.per_node.entry(sample.node_id.clone()).or_insert(0);
            if *count == 0 {
                self.discovery.push(sample.node_id.clone());
            }
            *count += 1;
        }
        if self.newest.map_or(true, |n| sample.timestamp > n) {
            self.newest = Some(sample.timestamp);
        }
        self.samples.push_back(sample);
    }

    fn prune(&mut self, policy: &RetentionPolicy) -> usize {
        let mut dropped: Vec<MetricSample> = Vec::new();

        let cutoff = chrono::Duration::from_std(policy.max_age)
            .ok()
            .and_then(|age| self.newest?.checked_sub_signed(age));
        if let Some(cutoff) = cutoff {
            while self
                .samples
                .front()
                .is_some_and(|s| s.timestamp < cutoff)
            {
                if let Some(s) = self.samples.pop_front() {
                    dropped.push(s);
                }
            }
        }

        while self.samples.len() > policy.max_samples {
            if let Some(s) = self.samples.pop_front() {
                dropped.push(s);
            }
        }

        let pruned = dropped.len();
        let mut emptied = HashSet::new();
        for sample in dropped.into_iter().filter(is_listed) {
            if let Some(count) = self.per_node.get_mut(&sample.node_id) {
                *count -= 1;
                if *count == 0 {
                    self.per_node.remove(&sample.node_id);
                    emptied.insert(sample.node_id);
                }
            }
        }
        if !emptied.is_empty() {
            self.discovery.retain(|id| !emptied.contains(id));
        }
        pruned
    }
}

/// Dispatches to unknown ids carry dimension 0 and stay out of discovery.
fn is_listed(sample: &MetricSample) -> bool {
    sample.dimension >= MIN_DIMENSION
}

#[derive(Default)]
struct Accumulator {
    dimension: i32,
    total_tcpr: f64,
    count: i64,
    successes: i64,
}

/// Thread-safe owner of the metric sample log.
pub struct MetricsAggregator {
    log: RwLock<MetricLog>,
    policy: RetentionPolicy,
}

impl MetricsAggregator {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            log: RwLock::new(MetricLog::default()),
            policy,
        }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Append a sample. Never rejects; may prune old history.
    pub fn record(&self, sample: MetricSample) {
        let mut log = self.log.write();
        log.push(sample);
        let pruned = log.prune(&self.policy);
        if pruned > 0 {
            debug!("Retention pruned {} samples", pruned);
        }
    }

    /// Summaries for `node_ids` over `[start_timestamp, end_timestamp]`
    /// (unix seconds, inclusive).
    ///
    /// An empty `node_ids` means every known node in discovery order;
    /// samples for unknown ids only show up when asked for by name.
    /// Nodes without samples in range are omitted. Duplicate ids are
    /// reported once, at their first position.
    pub fn query(&self, node_ids: &[String], start_timestamp: i64, end_timestamp: i64) -> Vec<NodeMetric> {
        if end_timestamp < start_timestamp {
            return Vec::new();
        }

        let log = self.log.read();

        let order: Vec<&str> = if node_ids.is_empty() {
            log.discovery.iter().map(String::as_str).collect()
        } else {
            let mut seen = HashSet::new();
            node_ids
                .iter()
                .map(String::as_str)
                .filter(|id| seen.insert(*id))
                .collect()
        };

        let mut acc: HashMap<&str, Accumulator> = order
            .iter()
            .map(|id| (*id, Accumulator::default()))
            .collect();

        for sample in &log.samples {
            let ts = sample.timestamp.timestamp();
            if ts < start_timestamp || ts > end_timestamp {
                continue;
            }
            if let Some(a) = acc.get_mut(sample.node_id.as_str()) {
                a.dimension = sample.dimension;
                a.total_tcpr += sample.tcpr_seconds;
                a.count += 1;
                if sample.success {
                    a.successes += 1;
                }
            }
        }

        order
            .iter()
            .filter_map(|id| {
                let a = acc.get(id)?;
                if a.count == 0 {
                    return None;
                }
                Some(NodeMetric {
                    node_id: id.to_string(),
                    dimension: a.dimension,
                    avg_tcpr: a.total_tcpr / a.count as f64,
                    request_count: a.count,
                    success_rate: a.successes as f64 / a.count as f64,
                })
            })
            .collect()
    }

    /// Per-band latency summary over all retained samples.
    pub fn latency_report(&self) -> LatencyReport {
        let log = self.log.read();
        LatencyReport::from_samples(log.samples.iter())
    }

    /// Number of retained samples.
    pub fn sample_count(&self) -> usize {
        self.log.read().samples.len()
    }

    /// Node ids with retained samples, in discovery order.
    pub fn known_nodes(&self) -> Vec<String> {
        self.log.read().discovery.clone()
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new(RetentionPolicy::default())
    }
}
