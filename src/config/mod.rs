//! Configuration management for alcalor
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::analytics::coverage::DEFAULT_SIGMA;
use crate::analytics::emerging::{DEFAULT_COMPARISON_YEARS, DEFAULT_EPSILON, DEFAULT_TOP_N};
use crate::analytics::{TermExtractor, TokenizationPolicy, WeightingMode};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Archive connection
    pub database: DatabaseConfig,

    /// Analysis defaults
    pub analysis: AnalysisConfig,

    /// Report output
    pub report: ReportConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Which archive backend to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    Sqlite,
}

impl FromStr for DatabaseBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            other => anyhow::bail!("unknown database backend: {other}"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,

    /// PostgreSQL connection string
    pub postgres_url: String,

    /// SQLite archive path
    pub sqlite_path: PathBuf,

    /// Maximum pool size
    pub pool_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Postgres,
            postgres_url: String::from("postgresql://localhost/alcalor"),
            sqlite_path: PathBuf::from("data/archive.db"),
            pool_size: 4,
        }
    }
}

/// Analysis defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub tokenization: TokenizationPolicy,

    /// Weighting used by emerging-term detection
    pub weighting: WeightingMode,

    /// Minimum number of documents a term must appear in
    pub min_df: usize,

    /// Maximum share of documents a term may appear in
    pub max_df_ratio: f64,

    /// Vocabulary cap, most frequent terms first
    pub max_features: Option<usize>,

    /// Smoothing term of the growth score
    pub epsilon: f64,

    /// Target weights at or below this are ignored
    pub min_target_weight: f64,

    /// Term analyses ignore bodies of this length or shorter
    pub min_body_length: usize,

    /// Cap on documents loaded per query
    pub max_documents: Option<usize>,

    pub default_comparison_years: u32,

    pub default_top_n: usize,

    /// Vocabulary size for co-occurrence when none is given
    pub cooccurrence_top_k: usize,

    /// Standard deviations beyond which a month is anomalous
    pub anomaly_sigma: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tokenization: TokenizationPolicy::default(),
            weighting: WeightingMode::Tf,
            min_df: 1,
            max_df_ratio: 1.0,
            max_features: None,
            epsilon: DEFAULT_EPSILON,
            min_target_weight: 0.0,
            min_body_length: 100,
            max_documents: Some(20_000),
            default_comparison_years: DEFAULT_COMPARISON_YEARS,
            default_top_n: DEFAULT_TOP_N,
            cooccurrence_top_k: 50,
            anomaly_sigma: DEFAULT_SIGMA,
        }
    }
}

impl AnalysisConfig {
    /// Term extractor with the configured tokenization and vocabulary limits
    #[must_use]
    pub fn term_extractor(&self) -> TermExtractor {
        TermExtractor::new(self.tokenization.clone())
            .with_weighting(self.weighting)
            .with_vocabulary_limits(self.min_df, self.max_df_ratio, self.max_features)
    }
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory for generated reports
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(backend) = std::env::var("ALCALOR_DB_BACKEND") {
            config.database.backend = backend.parse()?;
        }
        if let Ok(url) =
            std::env::var("ALCALOR_POSTGRES_URL").or_else(|_| std::env::var("DATABASE_URL"))
        {
            config.database.postgres_url = url;
        }
        if let Ok(path) = std::env::var("ALCALOR_SQLITE_PATH") {
            config.database.sqlite_path = PathBuf::from(path);
        }
        if let Some(size) = env_parse("ALCALOR_POOL_SIZE") {
            config.database.pool_size = size;
        }

        let analysis = &mut config.analysis;
        if let Ok(weighting) = std::env::var("ALCALOR_WEIGHTING") {
            analysis.weighting = weighting
                .parse()
                .with_context(|| format!("Invalid ALCALOR_WEIGHTING: {weighting}"))?;
        }
        if let Some(strip) = env_parse("ALCALOR_STRIP_ACCENTS") {
            analysis.tokenization.strip_accents = strip;
        }
        if let Some(length) = env_parse("ALCALOR_MIN_BODY_LENGTH") {
            analysis.min_body_length = length;
        }
        if let Some(max) = env_parse::<usize>("ALCALOR_MAX_DOCUMENTS") {
            analysis.max_documents = (max > 0).then_some(max);
        }

        if let Ok(dir) = std::env::var("ALCALOR_REPORT_DIR") {
            config.report.output_dir = PathBuf::from(dir);
        }
        if let Ok(level) = std::env::var("ALCALOR_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("ALCALOR_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            anyhow::bail!("pool_size must be greater than 0");
        }

        let analysis = &self.analysis;
        analysis
            .term_extractor()
            .validate()
            .context("Invalid term extraction settings")?;

        if !(analysis.epsilon.is_finite() && analysis.epsilon > 0.0) {
            anyhow::bail!("epsilon must be positive");
        }
        if !(analysis.anomaly_sigma.is_finite() && analysis.anomaly_sigma > 0.0) {
            anyhow::bail!("anomaly_sigma must be positive");
        }
        if analysis.default_top_n == 0 {
            anyhow::bail!("default_top_n must be greater than 0");
        }
        if analysis.default_comparison_years == 0 {
            anyhow::bail!("default_comparison_years must be greater than 0");
        }
        if analysis.cooccurrence_top_k == 0 {
            anyhow::bail!("cooccurrence_top_k must be greater than 0");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be 'text' or 'json'");
        }

        Ok(())
    }
}
