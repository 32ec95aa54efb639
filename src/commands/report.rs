use anyhow::{Context, Result};
use std::path::PathBuf;

use alcalor::analytics::{CooccurrenceConfig, EmergingTermsRequest, LexiconScorer};
use alcalor::error::{AlcalorErrorTrait, Error};
use alcalor::report::{Report, ReportWriter, Table};

use super::CommandContext;

const DEFAULT_REPORT_FILE: &str = "alcalor_report.html";
const RELATED_TOP_N: usize = 15;
const ACTORS_TOP_N: usize = 20;

pub struct ReportParams {
    pub output: Option<PathBuf>,
    pub years: Vec<i32>,
    pub focus_terms: Vec<String>,
}

/// Keep going when one year cannot be analyzed
fn skip_invalid<T>(section: &str, result: alcalor::error::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e @ Error::InvalidParameter(_)) => {
            tracing::warn!(section, category = ?e.category(), "{}", e.localized_desc());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn report(ctx: &CommandContext, params: ReportParams) -> Result<PathBuf> {
    println!("Building archive report");
    println!("=======================");

    let analyzer = &ctx.analyzer;
    let session = ctx.session();
    let defaults = analyzer.config();

    let stats = analyzer.archive_stats(session).await?;
    let years = if params.years.is_empty() {
        stats.last_year().into_iter().collect()
    } else {
        params.years
    };

    let mut report = Report::new(match (years.first(), years.last()) {
        (Some(first), Some(last)) if first != last => {
            format!("Al Calor Político: {first}-{last}")
        }
        (Some(year), _) => format!("Al Calor Político: {year}"),
        _ => "Al Calor Político".to_string(),
    });
    report.push(&stats);

    let volume = analyzer.volume_by_year(session).await?;
    report.push(volume.as_slice());

    let sentiment = analyzer
        .sentiment_by_year(session, None, None, &LexiconScorer::default())
        .await?;
    report.push(&sentiment);

    for &year in &years {
        println!("  Analyzing {year}...");
        let request = EmergingTermsRequest::new(year)
            .with_comparison_years(defaults.default_comparison_years)
            .with_top_n(defaults.default_top_n)
            .with_weighting(defaults.weighting)
            .with_epsilon(defaults.epsilon)
            .with_min_target_weight(defaults.min_target_weight);
        if let Some(emerging) = skip_invalid("emerging", analyzer.emerging_terms(session, &request).await)? {
            report.push(&emerging);
        }

        let actors = analyzer.key_actors(session, year, ACTORS_TOP_N).await?;
        let mut table = Table::from(&actors);
        table.title = format!("Key actors {year}");
        report.push(table);
    }

    let config = CooccurrenceConfig {
        top_k: defaults.cooccurrence_top_k,
        ..CooccurrenceConfig::default()
    };
    for term in &params.focus_terms {
        let related = analyzer
            .related_terms(session, term, None, RELATED_TOP_N, &config)
            .await?;
        let mut table = Table::from(related.as_slice());
        table.title = format!("Terms related to \"{term}\"");
        report.push(table);
    }

    let coverage = analyzer.coverage_anomalies(session, None, None).await?;
    report.push(&coverage);

    let writer = ReportWriter::new(&ctx.config.report.output_dir)
        .context("Failed to prepare report writer")?;
    let file = params
        .output
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_FILE));
    let path = writer.save(&report, &file).context("Failed to write report")?;

    println!("\nReport written to {}", path.display());
    Ok(path)
}
