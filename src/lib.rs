//! alcalor - NLP analysis over a Spanish news archive
//!
//! Trend analyses over the "Al Calor Político" article archive: weighted
//! term vectors per year, emerging terms, sentiment by year, term
//! co-occurrence, key actors and topic coverage anomalies.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`storage`] - Archive sessions (PostgreSQL, SQLite) and typed queries
//! - [`models`] - Documents and archive summaries
//! - [`analytics`] - Tokenization and the analyses themselves
//! - [`report`] - Tables and HTML reports built from results
//! - [`metrics`] - Prometheus counters and histograms
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use alcalor::analytics::{EmergingTermsRequest, NewsAnalyzer};
//! use alcalor::config::Config;
//! use alcalor::storage::SqliteArchive;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let archive = SqliteArchive::open(&config.database.sqlite_path)?;
//!     let analyzer = NewsAnalyzer::new(config.analysis.clone());
//!
//!     let result = analyzer
//!         .emerging_terms(&archive, &EmergingTermsRequest::new(2020))
//!         .await?;
//!     println!("{} emerging terms", result.len());
//!     Ok(())
//! }
//! ```

// Initialize rust-i18n at crate root level
rust_i18n::i18n!("locales", fallback = "en");

pub mod analytics;
pub mod config;
pub mod error;
pub mod i18n;
pub mod metrics;
pub mod models;
pub mod report;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analytics::{
        CooccurrenceConfig, EmergingTermsRequest, LexiconScorer, NewsAnalyzer, SentimentScorer,
        TokenizationPolicy, WeightingMode,
    };
    pub use crate::config::Config;
    pub use crate::error::{AlcalorErrorTrait, Error, ErrorCategory, Result};
    pub use crate::models::{ArchiveStats, Document, YearVolume};
    pub use crate::report::{Report, ReportWriter, Table};
    pub use crate::storage::{
        ArchiveSession, DocumentFilter, PostgresArchive, QueryError, SqliteArchive,
    };
}

// Direct re-exports for convenience
pub use models::Document;
