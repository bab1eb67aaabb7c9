//! Service configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{MAX_DIMENSION, MIN_DIMENSION};

/// Top-level orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MosaicConfig {
    /// HTTP server port.
    pub port: u16,
    /// Timeout applied to a `ProcessFractal` call when the caller gives none.
    pub dispatch_timeout: Duration,
    /// Samples older than this (relative to the newest sample) are pruned.
    pub retention: Duration,
    /// Hard cap on retained metric samples.
    pub max_samples: usize,
    /// Hard cap on registered nodes.
    pub max_nodes: usize,
    /// Seed the canonical network up to this dimension at startup.
    pub bootstrap_dimension: Option<i32>,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            port: 50051,
            dispatch_timeout: Duration::from_secs(30),
            retention: Duration::from_secs(24 * 60 * 60),
            max_samples: 100_000,
            max_nodes: 100_000,
            bootstrap_dimension: None,
        }
    }
}

impl MosaicConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let port = lookup("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);

        let dispatch_timeout = parse("MOSAIC_DISPATCH_TIMEOUT_SECS")
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.dispatch_timeout);

        let retention = parse("MOSAIC_RETENTION_SECS")
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.retention);

        let max_samples = parse("MOSAIC_MAX_SAMPLES")
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(defaults.max_samples);

        let max_nodes = parse("MOSAIC_MAX_NODES")
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(defaults.max_nodes);

        let bootstrap_dimension = lookup("MOSAIC_BOOTSTRAP_DIMENSION")
            .and_then(|v| v.trim().parse::<i32>().ok());

        Self {
            port,
            dispatch_timeout,
            retention,
            max_samples,
            max_nodes,
            bootstrap_dimension,
        }
    }

    /// Reject settings that parse but make no sense.
    pub fn validate(&self) -> Result<()> {
        if let Some(dim) = self.bootstrap_dimension {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&dim) {
                return Err(Error::Config(format!(
                    "MOSAIC_BOOTSTRAP_DIMENSION must be in {}..={}, got {}",
                    MIN_DIMENSION, MAX_DIMENSION, dim
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = MosaicConfig::from_lookup(|_| None);
        assert_eq!(config.port, 50051);
        assert_eq!(config.dispatch_timeout, Duration::from_secs(30));
        assert_eq!(config.max_samples, 100_000);
        assert!(config.bootstrap_dimension.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = MosaicConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("MOSAIC_DISPATCH_TIMEOUT_SECS", "5"),
            ("MOSAIC_RETENTION_SECS", "60"),
            ("MOSAIC_MAX_SAMPLES", "10"),
            ("MOSAIC_MAX_NODES", "20"),
            ("MOSAIC_BOOTSTRAP_DIMENSION", "9"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.dispatch_timeout, Duration::from_secs(5));
        assert_eq!(config.retention, Duration::from_secs(60));
        assert_eq!(config.max_samples, 10);
        assert_eq!(config.max_nodes, 20);
        assert_eq!(config.bootstrap_dimension, Some(9));
    }

    #[test]
    fn test_garbage_falls_back() {
        let config = MosaicConfig::from_lookup(lookup_from(&[
            ("PORT", "not-a-port"),
            ("MOSAIC_DISPATCH_TIMEOUT_SECS", "0"),
            ("MOSAIC_MAX_SAMPLES", "-1"),
        ]));
        assert_eq!(config.port, 50051);
        assert_eq!(config.dispatch_timeout, Duration::from_secs(30));
        assert_eq!(config.max_samples, 100_000);
    }

    #[test]
    fn test_validate_bootstrap_dimension() {
        assert!(MosaicConfig::default().validate().is_ok());

        let ok = MosaicConfig::from_lookup(lookup_from(&[("MOSAIC_BOOTSTRAP_DIMENSION", "27")]));
        assert!(ok.validate().is_ok());

        for bad in ["0", "28", "-3"] {
            let config = MosaicConfig::from_lookup(lookup_from(&[("MOSAIC_BOOTSTRAP_DIMENSION", bad)]));
            let err = config.validate().unwrap_err();
            assert_eq!(err.kind(), "Config");
            assert!(err.to_string().contains(bad));
        }
    }
}
