use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alcalor::analytics::{AssociationMeasure, CooccurrenceWindow, WeightingMode};
use alcalor::config::Config;
use alcalor::error::{AlcalorErrorTrait, Error};

mod commands;

use commands::{CommandContext, CooccurParams, EmergingParams, OutputFormat, ReportParams};

#[derive(Parser)]
#[command(
    name = "alcalor",
    version,
    about = "Trend analyses over the Al Calor Político news archive",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// How results are printed
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    output_format: OutputFormat,

    /// Write Prometheus metrics to this file when the command finishes
    #[arg(long, global = true)]
    metrics_out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive-wide statistics
    Stats,

    /// Article count and mean body length per year
    Volume,

    /// Terms that gained weight in a year against the prior years
    Emerging {
        /// Target year
        #[arg(short, long)]
        year: i32,

        /// Number of prior years in the baseline
        #[arg(long)]
        comparison_years: Option<u32>,

        /// Number of terms to report
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Term weighting (raw_count, tf, tfidf)
        #[arg(short, long)]
        weighting: Option<WeightingMode>,
    },

    /// Mean lexicon polarity per year
    Sentiment {
        #[arg(long)]
        start_year: Option<i32>,

        #[arg(long)]
        end_year: Option<i32>,
    },

    /// Term co-occurrence, or the partners of one term
    Cooccur {
        /// Report the strongest partners of this term
        #[arg(short, long)]
        term: Option<String>,

        /// Restrict to one publication year
        #[arg(short, long)]
        year: Option<i32>,

        /// Explicit vocabulary (comma separated)
        #[arg(long, value_delimiter = ',')]
        vocabulary: Vec<String>,

        /// Window (document, sentence)
        #[arg(long, default_value = "document")]
        window: CooccurrenceWindow,

        /// Association measure (count, pmi, npmi)
        #[arg(short, long, default_value = "count")]
        measure: AssociationMeasure,

        /// Vocabulary size when none is given
        #[arg(long)]
        top_k: Option<usize>,

        /// Number of rows to report
        #[arg(short = 'n', long, default_value = "20")]
        top_n: usize,
    },

    /// Top terms of a year range by mean TF-IDF
    Terms {
        #[arg(long)]
        start_year: i32,

        #[arg(long)]
        end_year: i32,

        #[arg(short = 'n', long)]
        top_n: Option<usize>,
    },

    /// Most mentioned proper names in a year
    Actors {
        #[arg(short, long)]
        year: i32,

        #[arg(short = 'n', long, default_value = "20")]
        top_n: usize,
    },

    /// Months whose topic coverage deviates from the norm
    Coverage {
        /// Standard deviations beyond which a month is anomalous
        #[arg(long)]
        sigma: Option<f64>,
    },

    /// Render an HTML report
    Report {
        /// Output file, relative to the configured report directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Years to analyze (defaults to the latest year in the archive)
        #[arg(long, value_delimiter = ',')]
        years: Vec<i32>,

        /// Terms whose partners are listed
        #[arg(long, value_delimiter = ',')]
        focus_terms: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    alcalor::i18n::init_from_env();

    let config = load_config(cli.config.as_deref())?;

    // Initialize tracing/logging
    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, cli.verbose, &config.logging.level)?;

    if cli.metrics_out.is_some() {
        if let Err(e) = alcalor::metrics::init_metrics() {
            tracing::warn!(error = %e, "Metrics initialization failed");
        }
    }

    tracing::info!(backend = ?config.database.backend, "alcalor starting");

    let output_format = cli.output_format;
    let metrics_out = cli.metrics_out.clone();
    let result = run(cli.command, config, output_format).await;

    if let Some(path) = metrics_out {
        write_metrics(&path)?;
    }

    if let Err(e) = &result {
        if let Some(err) = e.downcast_ref::<Error>() {
            tracing::error!(
                category = ?err.category(),
                recoverable = err.is_recoverable(),
                "{}",
                err.localized_desc()
            );
        }
    }
    result
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run(command: Commands, config: Config, output_format: OutputFormat) -> Result<()> {
    let ctx = CommandContext::new(config)?;

    let tables = match command {
        Commands::Stats => commands::stats(&ctx).await?,

        Commands::Volume => commands::volume(&ctx).await?,

        Commands::Emerging {
            year,
            comparison_years,
            top_n,
            weighting,
        } => {
            tracing::info!(
                year = %year,
                comparison_years = ?comparison_years,
                top_n = ?top_n,
                weighting = ?weighting,
                "Starting emerging command"
            );
            let params = EmergingParams {
                year,
                comparison_years,
                top_n,
                weighting,
            };
            commands::emerging(&ctx, params).await?
        }

        Commands::Sentiment {
            start_year,
            end_year,
        } => commands::sentiment(&ctx, start_year, end_year).await?,

        Commands::Cooccur {
            term,
            year,
            vocabulary,
            window,
            measure,
            top_k,
            top_n,
        } => {
            tracing::info!(
                term = ?term,
                year = ?year,
                window = %window,
                measure = %measure,
                "Starting cooccur command"
            );
            let params = CooccurParams {
                term,
                year,
                vocabulary,
                window,
                measure,
                top_k,
                top_n,
            };
            commands::cooccur(&ctx, params).await?
        }

        Commands::Terms {
            start_year,
            end_year,
            top_n,
        } => commands::terms(&ctx, start_year, end_year, top_n).await?,

        Commands::Actors { year, top_n } => commands::actors(&ctx, year, top_n).await?,

        Commands::Coverage { sigma } => commands::coverage(&ctx, sigma).await?,

        Commands::Report {
            output,
            years,
            focus_terms,
        } => {
            tracing::info!(
                output = ?output,
                years = ?years,
                focus_terms = ?focus_terms,
                "Starting report command"
            );
            let params = ReportParams {
                output,
                years,
                focus_terms,
            };
            commands::report(&ctx, params).await?;
            return Ok(());
        }
    };

    commands::emit(&tables, output_format)?;
    tracing::info!("alcalor completed successfully");
    Ok(())
}

fn write_metrics(path: &std::path::Path) -> Result<()> {
    let text = alcalor::metrics::encode_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to encode metrics: {e}"))?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write metrics: {}", path.display()))?;
    tracing::info!(path = %path.display(), "Metrics written");
    Ok(())
}

fn setup_tracing(format: &str, verbose: bool, level: &str) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("alcalor=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("alcalor={level},warn"))
            .context("Invalid log level")?
    };

    // Logs go to stderr so stdout carries only results
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
