//! Mosaic Metrics: per-node TCPR samples and the views derived from them.
//!
//! `MetricsAggregator` owns the append-only sample log. It answers
//! time-windowed `NodeMetric` queries and builds per-band latency reports.
//! Nodes are referenced by id only; the aggregator never consults the
//! registry.

pub mod aggregator;
pub mod report;

pub use aggregator::{MetricsAggregator, RetentionPolicy};
pub use report::{BandReport, LatencyReport};
