//! Run configuration.
//!
//! Sweeps and detail runs can be configured from CLI flags or from RON
//! files. Every field has a default, so a config file only needs the fields
//! it changes.

use std::path::{Path, PathBuf};

use diffdice_core::batch::BatchConfig;
use diffdice_core::error::SimError;
use diffdice_core::evaluation::SweepSettings;
use diffdice_core::strategy::Strategy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found.
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Parsed values cannot run.
    #[error("Invalid config: {0}")]
    Invalid(#[from] SimError),
}

fn load_ron<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(ron::from_str(&contents)?)
}

/// Configuration for an exhaustive sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Games per strategy.
    pub repetitions: u32,
    /// Base seed (`None` = draw from entropy).
    pub seed: Option<u64>,
    /// Worker threads (0 = rayon default).
    pub parallel_workers: u32,
    /// Output directory for results.
    pub output_dir: PathBuf,
    /// Rows to print in reports.
    pub top: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            repetitions: 1000,
            seed: None,
            parallel_workers: 0,
            output_dir: PathBuf::from("results"),
            top: 20,
        }
    }
}

impl SweepConfig {
    /// Config for `repetitions` games per strategy.
    pub fn new(repetitions: u32) -> Self {
        Self {
            repetitions,
            ..Default::default()
        }
    }

    /// Set base seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set worker count
    pub fn with_parallel(mut self, workers: u32) -> Self {
        self.parallel_workers = workers;
        self
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Engine settings for this sweep.
    pub fn settings(&self) -> SweepSettings {
        SweepSettings {
            repetitions: self.repetitions,
            seed: self.seed,
        }
    }

    /// Reject configs that cannot run.
    pub fn validate(&self) -> Result<(), SimError> {
        self.settings().validate()
    }

    /// Load and validate a sweep config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: Self = load_ron(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration for repeated games of one strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    /// Strategy to play.
    pub strategy: Strategy,
    /// Games to play.
    pub games: u32,
    /// Dice seed (`None` = draw from entropy).
    pub seed: Option<u64>,
    /// Keep every move of every game.
    pub trace: bool,
    /// Output directory for results.
    pub output_dir: PathBuf,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::one_each(),
            games: 1000,
            seed: None,
            trace: false,
            output_dir: PathBuf::from("results"),
        }
    }
}

impl PlayConfig {
    /// Config for `games` games of `strategy`.
    pub fn new(strategy: Strategy, games: u32) -> Self {
        Self {
            strategy,
            games,
            ..Default::default()
        }
    }

    /// Set dice seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Keep move traces
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Engine batch config for this run.
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            repetitions: self.games,
            trace: self.trace,
            seed: self.seed,
        }
    }

    /// Reject configs that cannot run.
    pub fn validate(&self) -> Result<(), SimError> {
        self.batch_config().validate()
    }

    /// Load and validate a play config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: Self = load_ron(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_config_default() {
        let config = SweepConfig::default();
        assert_eq!(config.repetitions, 1000);
        assert_eq!(config.parallel_workers, 0);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_sweep_config_builder() {
        let config = SweepConfig::new(250)
            .with_output(PathBuf::from("/tmp/results"))
            .with_parallel(4)
            .with_seed(12345);

        assert_eq!(config.repetitions, 250);
        assert_eq!(config.parallel_workers, 4);
        assert_eq!(config.settings().seed, Some(12345));
    }

    #[test]
    fn test_sweep_config_from_ron() {
        let config = SweepConfig::from_ron_str("(repetitions: 50, seed: Some(9))").unwrap();
        assert_eq!(config.repetitions, 50);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.top, 20);
    }

    #[test]
    fn test_sweep_config_rejects_zero() {
        let err = SweepConfig::from_ron_str("(repetitions: 0)").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(SimError::InvalidRepetitionCount(0))
        ));
    }

    #[test]
    fn test_play_config_from_ron() {
        let config = PlayConfig::from_ron_str(
            "(strategy: {0: 1, 3: 5}, games: 10, trace: true)",
        )
        .unwrap();
        assert_eq!(config.strategy.counts(), [1, 0, 0, 5, 0, 0]);
        assert_eq!(config.games, 10);
        assert!(config.batch_config().trace);
    }

    #[test]
    fn test_play_config_rejects_bad_strategy() {
        assert!(PlayConfig::from_ron_str("(strategy: {0: 5})").is_err());
        assert!(PlayConfig::from_ron_str("(strategy: {6: 6})").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = SweepConfig::load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
