//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `autogov.toml` in the working directory unless a path is
//! given. Every field has a sensible default so the file is optional.
//! Environment variables take precedence over file values.

use std::path::Path;

use autogov_adapter_csv::CsvConfig;
use autogov_app::report::ReportSettings;
use autogov_domain::error::GovernanceError;
use autogov_domain::policy::{DEFAULT_SIMILARITY_THRESHOLD, GovernancePolicy};
use autogov_domain::similarity::{ClusteringMode, ScorerKind};
use serde::Deserialize;

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "autogov.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Thresholds of the action cascade and the report views.
    pub policy: GovernancePolicy,
    /// Near-duplicate name grouping.
    pub clustering: ClusteringConfig,
    /// How exports are read.
    pub ingest: CsvConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Similarity clustering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Minimum score for two names to be grouped.
    pub threshold: f64,
    pub scorer: ScorerKind,
    pub mode: ClusteringMode,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path`, or `autogov.toml` (if present), then
    /// apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed, if an explicit `path`
    /// cannot be read, or if a value is out of range.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path, true)?,
            None => Self::from_file(Path::new(DEFAULT_CONFIG_FILE), false)?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("AUTOGOV_CLUSTER_THRESHOLD")
            && let Ok(threshold) = val.parse()
        {
            self.clustering.threshold = threshold;
        }
        if let Some(val) = var("AUTOGOV_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.report_settings()
            .validate()
            .map_err(|err| ConfigError::Validation(describe(&err)))?;
        self.ingest
            .delimiter_byte()
            .map_err(|err| ConfigError::Validation(err.to_string()))?;
        Ok(())
    }

    /// Settings handed to the analysis service.
    #[must_use]
    pub fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            policy: self.policy.clone(),
            similarity_threshold: self.clustering.threshold,
            scorer: self.clustering.scorer,
            clustering_mode: self.clustering.mode,
        }
    }
}

fn describe(err: &GovernanceError) -> String {
    match err {
        GovernanceError::Validation(inner) => inner.to_string(),
        other => other.to_string(),
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            scorer: ScorerKind::default(),
            mode: ClusteringMode::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "autogov=info,autogov_app=info,autogov_adapter_csv=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
