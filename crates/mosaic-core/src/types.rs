//! Data model shared across the orchestrator crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lowest dimension a node may carry.
pub const MIN_DIMENSION: i32 = 1;
/// Documented ceiling for fractal depth.
pub const MAX_DIMENSION: i32 = 27;

/// A validated node dimension in `MIN_DIMENSION..=MAX_DIMENSION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Dimension(u8);

impl Dimension {
    /// Validate a raw dimension value.
    pub fn new(value: i32) -> Result<Self> {
        if (MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(Error::DimensionOutOfRange(format!(
                "dimension {} not in [{}, {}]",
                value, MIN_DIMENSION, MAX_DIMENSION
            )))
        }
    }

    pub fn get(self) -> i32 {
        self.0 as i32
    }

    /// Latency band this dimension belongs to.
    pub fn band(self) -> DimensionBand {
        if self.get() <= DimensionBand::PRIMARY_CEILING {
            DimensionBand::Primary
        } else {
            DimensionBand::Extended
        }
    }
}

impl TryFrom<i32> for Dimension {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Dimension> for i32 {
    fn from(d: Dimension) -> i32 {
        d.get()
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Latency tier a dimension falls into. Targets are observed, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionBand {
    /// Dimensions 1–9, expected TCPR ≤ 2s.
    Primary,
    /// Dimensions 10–27, expected TCPR ≤ 10s.
    Extended,
}

impl DimensionBand {
    const PRIMARY_CEILING: i32 = 9;

    /// Band for a raw dimension, or `None` outside the valid range.
    pub fn for_dimension(dimension: i32) -> Option<Self> {
        Dimension::new(dimension).ok().map(Dimension::band)
    }

    /// Target TCPR in seconds.
    pub fn target_tcpr(self) -> f64 {
        match self {
            Self::Primary => 2.0,
            Self::Extended => 10.0,
        }
    }

    /// Inclusive dimension range covered by this band.
    pub fn range(self) -> std::ops::RangeInclusive<i32> {
        match self {
            Self::Primary => MIN_DIMENSION..=Self::PRIMARY_CEILING,
            Self::Extended => (Self::PRIMARY_CEILING + 1)..=MAX_DIMENSION,
        }
    }

    pub fn all() -> [Self; 2] {
        [Self::Primary, Self::Extended]
    }
}

impl std::fmt::Display for DimensionBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let r = self.range();
        write!(f, "dim_{}_{}", r.start(), r.end())
    }
}

/// A unit in the fractal tree. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub dimension: Dimension,
    pub created_at: DateTime<Utc>,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// One observation of a `ProcessFractal` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub node_id: String,
    /// Dimension of the node at dispatch time; 0 when the node was unknown.
    pub dimension: i32,
    pub tcpr_seconds: f64,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl MetricSample {
    /// Sample stamped with the current time.
    pub fn now(node_id: impl Into<String>, dimension: i32, tcpr_seconds: f64, success: bool) -> Self {
        Self {
            node_id: node_id.into(),
            dimension,
            tcpr_seconds,
            success,
            timestamp: Utc::now(),
        }
    }
}

/// Time-windowed summary for one node. Derived on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetric {
    pub node_id: String,
    pub dimension: i32,
    pub avg_tcpr: f64,
    pub request_count: i64,
    pub success_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_bounds() {
        assert!(Dimension::new(0).is_err());
        assert!(Dimension::new(28).is_err());
        assert_eq!(Dimension::new(1).unwrap().get(), 1);
        assert_eq!(Dimension::new(27).unwrap().get(), 27);
        assert!(matches!(
            Dimension::new(-3),
            Err(Error::DimensionOutOfRange(_))
        ));
    }

    #[test]
    fn test_bands() {
        assert_eq!(Dimension::new(9).unwrap().band(), DimensionBand::Primary);
        assert_eq!(Dimension::new(10).unwrap().band(), DimensionBand::Extended);
        assert_eq!(DimensionBand::for_dimension(0), None);
        assert_eq!(DimensionBand::Primary.target_tcpr(), 2.0);
        assert_eq!(DimensionBand::Extended.target_tcpr(), 10.0);
        assert_eq!(DimensionBand::Extended.to_string(), "dim_10_27");
    }

    #[test]
    fn test_dimension_serde() {
        let d: Dimension = serde_json::from_str("12").unwrap();
        assert_eq!(d.get(), 12);
        assert_eq!(serde_json::to_string(&d).unwrap(), "12");
        assert!(serde_json::from_str::<Dimension>("40").is_err());
    }
}
