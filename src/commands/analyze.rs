use anyhow::Result;

use alcalor::analytics::{
    AssociationMeasure, CooccurrenceConfig, CooccurrenceWindow, EmergingTermsRequest,
    LexiconScorer, WeightingMode,
};
use alcalor::report::Table;
use alcalor::storage::DocumentFilter;

use super::CommandContext;

pub async fn stats(ctx: &CommandContext) -> Result<Vec<Table>> {
    let stats = ctx.analyzer.archive_stats(ctx.session()).await?;
    Ok(vec![Table::from(&stats)])
}

pub async fn volume(ctx: &CommandContext) -> Result<Vec<Table>> {
    let volume = ctx.analyzer.volume_by_year(ctx.session()).await?;
    Ok(vec![Table::from(volume.as_slice())])
}

pub struct EmergingParams {
    pub year: i32,
    pub comparison_years: Option<u32>,
    pub top_n: Option<usize>,
    pub weighting: Option<WeightingMode>,
}

pub async fn emerging(ctx: &CommandContext, params: EmergingParams) -> Result<Vec<Table>> {
    let defaults = ctx.analyzer.config();
    let request = EmergingTermsRequest::new(params.year)
        .with_comparison_years(params.comparison_years.unwrap_or(defaults.default_comparison_years))
        .with_top_n(params.top_n.unwrap_or(defaults.default_top_n))
        .with_weighting(params.weighting.unwrap_or(defaults.weighting))
        .with_epsilon(defaults.epsilon)
        .with_min_target_weight(defaults.min_target_weight);

    let result = ctx.analyzer.emerging_terms(ctx.session(), &request).await?;
    if result.skipped_documents > 0 {
        tracing::warn!(skipped = result.skipped_documents, "Some documents could not be tokenized");
    }
    Ok(vec![Table::from(&result)])
}

pub async fn sentiment(
    ctx: &CommandContext,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> Result<Vec<Table>> {
    let summary = ctx
        .analyzer
        .sentiment_by_year(ctx.session(), start_year, end_year, &LexiconScorer::default())
        .await?;
    Ok(vec![Table::from(&summary)])
}

pub struct CooccurParams {
    pub term: Option<String>,
    pub year: Option<i32>,
    pub vocabulary: Vec<String>,
    pub window: CooccurrenceWindow,
    pub measure: AssociationMeasure,
    pub top_k: Option<usize>,
    pub top_n: usize,
}

pub async fn cooccur(ctx: &CommandContext, params: CooccurParams) -> Result<Vec<Table>> {
    let config = CooccurrenceConfig {
        window: params.window,
        measure: params.measure,
        top_k: params.top_k.unwrap_or(ctx.config.analysis.cooccurrence_top_k),
        vocabulary: (!params.vocabulary.is_empty()).then_some(params.vocabulary),
        ..CooccurrenceConfig::default()
    };

    if let Some(term) = params.term {
        let related = ctx
            .analyzer
            .related_terms(ctx.session(), &term, params.year, params.top_n, &config)
            .await?;
        let mut table = Table::from(related.as_slice());
        table.title = format!("Terms related to \"{term}\"");
        return Ok(vec![table]);
    }

    let mut filter = DocumentFilter::new();
    if let Some(year) = params.year {
        filter = filter.year(year);
    }
    let mut result = ctx
        .analyzer
        .cooccurrences(ctx.session(), &filter, &config)
        .await?;
    result.pairs.truncate(params.top_n);
    Ok(vec![Table::from(&result)])
}

pub async fn terms(
    ctx: &CommandContext,
    start_year: i32,
    end_year: i32,
    top_n: Option<usize>,
) -> Result<Vec<Table>> {
    let top_n = top_n.unwrap_or(ctx.config.analysis.default_top_n);
    let top = ctx
        .analyzer
        .top_terms(ctx.session(), start_year, end_year, top_n)
        .await?;
    Ok(vec![Table::from(&top)])
}

pub async fn actors(ctx: &CommandContext, year: i32, top_n: usize) -> Result<Vec<Table>> {
    let actors = ctx.analyzer.key_actors(ctx.session(), year, top_n).await?;
    let mut table = Table::from(&actors);
    table.title = format!("Key actors {year}");
    Ok(vec![table])
}

pub async fn coverage(ctx: &CommandContext, sigma: Option<f64>) -> Result<Vec<Table>> {
    let report = ctx
        .analyzer
        .coverage_anomalies(ctx.session(), None, sigma)
        .await?;
    Ok(vec![Table::from(&report)])
}
