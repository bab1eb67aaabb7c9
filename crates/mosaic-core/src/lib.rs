//! Mosaic Core: data model, error taxonomy, configuration.
//!
//! Everything the registry, metrics, and runtime crates share lives here so
//! none of them has to depend on another just for a type definition.

pub mod config;
pub mod error;
pub mod types;

pub use config::MosaicConfig;
pub use error::{Error, Result};
pub use types::{
    Dimension, DimensionBand, MetricSample, Node, NodeMetric, MAX_DIMENSION, MIN_DIMENSION,
};
