//! Configuration module for tmix-ingest
//!
//! Holds the knobs the ingestion core consumes: keep-probability, pair
//! capacity, random seed, execution mode and the options applied to every
//! node pair. Configuration can be loaded from a TOML file and is then
//! overridden by command-line flags.
//!
//! # Example
//!
//! ```toml
//! keep_probability = 0.25
//! cvecs_per_pair = 5000
//! seed = 7
//!
//! [pair]
//! lossless = true
//! ```

use crate::error::{IngestError, Result, ResultExt};
use crate::pipeline::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default fraction of connection vectors to keep
pub const DEFAULT_KEEP_PROBABILITY: f64 = 1.0;

/// Default number of connection vectors per initiator/acceptor node pair
pub const DEFAULT_CVECS_PER_PAIR: usize = 10_000;

fn default_keep_probability() -> f64 {
    DEFAULT_KEEP_PROBABILITY
}

fn default_cvecs_per_pair() -> usize {
    DEFAULT_CVECS_PER_PAIR
}

fn default_true() -> bool {
    true
}

/// Options applied to every node pair before its first connection vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairOptions {
    /// Disable link loss on the pair's simulated path
    #[serde(default = "default_true")]
    pub lossless: bool,
}

impl Default for PairOptions {
    fn default() -> Self {
        Self { lossless: true }
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Independent per-record probability of keeping a connection vector
    #[serde(default = "default_keep_probability")]
    pub keep_probability: f64,

    /// Capacity of each node pair
    #[serde(default = "default_cvecs_per_pair")]
    pub cvecs_per_pair: usize,

    /// Seed for the random draw source. `None` seeds from OS entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Run inbound and outbound on separate threads
    #[serde(default)]
    pub parallel: bool,

    #[serde(default)]
    pub pair: PairOptions,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            keep_probability: DEFAULT_KEEP_PROBABILITY,
            cvecs_per_pair: DEFAULT_CVECS_PER_PAIR,
            seed: None,
            parallel: false,
            pair: PairOptions::default(),
        }
    }
}

impl IngestConfig {
    /// Load a configuration file (TOML)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IngestError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            IngestError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        config
            .validate()
            .with_context(|| format!("Invalid values in config file {:?}", path))?;
        tracing::debug!("Loaded ingest config from {:?}", path);
        Ok(config)
    }

    /// Save configuration to disk as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                IngestError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| IngestError::Serialization(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            IngestError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Check the values the pipeline relies on. Runs before any stream is read.
    pub fn validate(&self) -> PipelineResult<()> {
        if !(0.0..=1.0).contains(&self.keep_probability) {
            return Err(PipelineError::InvalidConfiguration(format!(
                "keep_probability must be within [0.0, 1.0], got {}",
                self.keep_probability
            )));
        }
        if self.cvecs_per_pair == 0 {
            return Err(PipelineError::InvalidConfiguration(
                "cvecs_per_pair must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_keep_probability(mut self, keep_probability: f64) -> Self {
        self.keep_probability = keep_probability;
        self
    }

    pub fn with_cvecs_per_pair(mut self, cvecs_per_pair: usize) -> Self {
        self.cvecs_per_pair = cvecs_per_pair;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.keep_probability, 1.0);
        assert_eq!(config.cvecs_per_pair, 10_000);
        assert!(config.pair.lossless);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_probability() {
        for p in [-0.1, 1.5, f64::NAN] {
            let config = IngestConfig::default().with_keep_probability(p);
            assert!(matches!(
                config.validate(),
                Err(PipelineError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(IngestConfig::default()
            .with_keep_probability(0.0)
            .validate()
            .is_ok());
        assert!(IngestConfig::default()
            .with_keep_probability(1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = IngestConfig::default().with_cvecs_per_pair(0);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: IngestConfig = toml::from_str("keep_probability = 0.5\n").unwrap();
        assert_eq!(config.keep_probability, 0.5);
        assert_eq!(config.cvecs_per_pair, DEFAULT_CVECS_PER_PAIR);
        assert_eq!(config.seed, None);
        assert!(config.pair.lossless);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ingest.toml");

        let config = IngestConfig::default()
            .with_keep_probability(0.25)
            .with_cvecs_per_pair(15)
            .with_seed(99);
        config.save(&path).unwrap();

        let loaded = IngestConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingest.toml");
        std::fs::write(&path, "cvecs_per_pair = 0\n").unwrap();

        let err = IngestConfig::load(&path).unwrap_err();
        let IngestError::WithContext { context, source } = err else {
            panic!("expected context-wrapped error");
        };
        assert!(context.contains("ingest.toml"));
        assert!(matches!(
            *source,
            IngestError::Pipeline(PipelineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = IngestConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, IngestError::Config(_)));
    }
}
