//! Compression and loader configuration.
//!
//! Every threshold the algorithms use is passed to them explicitly; the
//! defaults below are the only place default values live.

use crate::error::{Result, SiatecError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default minimum number of new points a Forth TEC must contribute.
pub const DEFAULT_C_MIN: usize = 15;

/// Default overlap fraction for attaching a secondary TEC to a primary.
pub const DEFAULT_SIGMA_MIN: f64 = 0.5;

/// Configuration for a compression run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Selector to run.
    pub algorithm: Algorithm,
    /// Pipeline used to build TECs.
    pub discovery: DiscoveryStrategy,
    /// Forth's algorithm thresholds.
    pub forth: ForthConfig,
    /// Drop candidate TECs below this compression ratio before selecting.
    pub min_compression_ratio: Option<f64>,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            discovery: DiscoveryStrategy::default(),
            forth: ForthConfig::default(),
            min_compression_ratio: None,
        }
    }
}

/// Covering selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Iteratively take the best TEC of the remaining points.
    #[default]
    Cosiatec,
    /// One greedy pass over the quality-sorted TEC universe.
    SiatecCompress,
    /// Salience-weighted cover with primary and secondary TECs.
    Forth,
}

/// How TECs are constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStrategy {
    /// Sorted dense vector table with the row-merge translator finder.
    #[default]
    VectorTable,
    /// Hashed difference index with posting-list intersection.
    Hashed,
}

/// Forth's algorithm thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForthConfig {
    /// Minimum new points a TEC must add to stay a candidate.
    pub c_min: usize,
    /// Coverage overlap above which a TEC becomes a secondary.
    pub sigma_min: f64,
}

impl Default for ForthConfig {
    fn default() -> Self {
        Self {
            c_min: DEFAULT_C_MIN,
            sigma_min: DEFAULT_SIGMA_MIN,
        }
    }
}

/// What the loader does with a row it cannot use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedRowPolicy {
    /// Fail the whole load.
    #[default]
    Reject,
    /// Log and drop the row.
    Skip,
}

/// Point loader configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub on_malformed: MalformedRowPolicy,
}

impl LoaderConfig {
    /// Drop malformed rows instead of failing.
    pub fn lenient() -> Self {
        Self {
            on_malformed: MalformedRowPolicy::Skip,
        }
    }
}

impl CompressionConfig {
    /// COSIATEC on the hash pipeline, for large inputs.
    pub fn large_dataset() -> Self {
        Self {
            discovery: DiscoveryStrategy::Hashed,
            ..Default::default()
        }
    }

    /// Forth's algorithm with the given thresholds.
    pub fn forth(c_min: usize, sigma_min: f64) -> Self {
        Self {
            algorithm: Algorithm::Forth,
            forth: ForthConfig { c_min, sigma_min },
            ..Default::default()
        }
    }

    /// Parse from YAML. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| SiatecError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| SiatecError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&yaml)
    }

    /// Check thresholds are in range.
    pub fn validate(&self) -> Result<()> {
        let sigma = self.forth.sigma_min;
        if !(0.0..=1.0).contains(&sigma) {
            return Err(SiatecError::InvalidConfig(format!(
                "sigma_min must be within [0, 1], got {}",
                sigma
            )));
        }
        if let Some(min_cr) = self.min_compression_ratio {
            if !min_cr.is_finite() || min_cr < 0.0 {
                return Err(SiatecError::InvalidConfig(format!(
                    "min_compression_ratio must be a non-negative number, got {}",
                    min_cr
                )));
            }
        }
        Ok(())
    }
}
