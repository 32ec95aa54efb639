pub mod analyze;
pub mod report;

use anyhow::{Context, Result};

use alcalor::analytics::NewsAnalyzer;
use alcalor::config::{Config, DatabaseBackend, DatabaseConfig};
use alcalor::report::Table;
use alcalor::storage::{ArchiveSession, PostgresArchive, SqliteArchive};

// Re-export command functions for convenience
pub use analyze::{
    actors, cooccur, coverage, emerging, sentiment, stats, terms, volume, CooccurParams,
    EmergingParams,
};
pub use report::{report, ReportParams};

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// What every command runs against
pub struct CommandContext {
    pub config: Config,
    pub session: Box<dyn ArchiveSession>,
    pub analyzer: NewsAnalyzer,
}

impl CommandContext {
    pub fn new(config: Config) -> Result<Self> {
        let session = open_session(&config.database)?;
        let analyzer = NewsAnalyzer::new(config.analysis.clone());
        Ok(Self {
            config,
            session,
            analyzer,
        })
    }

    pub fn session(&self) -> &dyn ArchiveSession {
        self.session.as_ref()
    }
}

/// Open the configured archive backend
pub fn open_session(config: &DatabaseConfig) -> Result<Box<dyn ArchiveSession>> {
    match config.backend {
        DatabaseBackend::Postgres => {
            let archive = PostgresArchive::connect(config)
                .context("Failed to create PostgreSQL archive pool")?;
            Ok(Box::new(archive))
        }
        DatabaseBackend::Sqlite => {
            let archive = SqliteArchive::open(&config.sqlite_path).with_context(|| {
                format!(
                    "Failed to open SQLite archive: {}",
                    config.sqlite_path.display()
                )
            })?;
            Ok(Box::new(archive))
        }
    }
}

/// Print command results
pub fn emit(tables: &[Table], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for table in tables {
                println!("{}", table.to_text());
            }
        }
        OutputFormat::Json => {
            let json = match tables {
                [table] => serde_json::to_string_pretty(table),
                tables => serde_json::to_string_pretty(tables),
            }
            .context("Failed to serialize results")?;
            println!("{json}");
        }
    }
    Ok(())
}
