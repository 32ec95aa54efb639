//! Analysis calls against an archive session
//!
//! [`NewsAnalyzer`] validates a request, queries the archive through an
//! explicit [`ArchiveSession`], then hands the documents to the pure
//! analytics. Parameter errors are raised before any query runs; query
//! errors surface unmodified.
//!
//! # Usage
//!
//! ```rust,ignore
//! let archive = SqliteArchive::open("archive.db")?;
//! let analyzer = NewsAnalyzer::new(config.analysis.clone());
//!
//! let emerging = analyzer
//!     .emerging_terms(&archive, &EmergingTermsRequest::new(2020))
//!     .await?;
//! ```

use super::actors::ActorExtractor;
use super::cooccurrence::{CooccurrenceAnalyzer, CooccurrenceConfig, CooccurrenceResult, RelatedTerm};
use super::coverage::{CoverageAnalyzer, CoverageReport, Topic};
use super::emerging::{EmergingTermDetector, EmergingTermResult, EmergingTermsRequest};
use super::sentiment::{SentimentAggregator, SentimentScorer, SentimentSummary};
use super::terms::TopTerms;
use super::{validate_year_range, ActorMentions, InvalidParameterError};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::metrics;
use crate::models::{ArchiveStats, Document, YearVolume};
use crate::storage::{ArchiveSession, ArticleRepository, DocumentFilter};

/// Runs analyses with a fixed set of defaults
#[derive(Debug, Clone, Default)]
pub struct NewsAnalyzer {
    config: AnalysisConfig,
}

/// Count an analysis outcome and log failures
fn finish<T>(analysis: &str, result: Result<T>) -> Result<T> {
    metrics::record_analysis(analysis, result.is_ok());
    if let Err(e) = &result {
        tracing::error!(analysis, error = %e, "Analysis failed");
    }
    result
}

impl NewsAnalyzer {
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Apply the configured document cap
    fn capped(&self, filter: DocumentFilter) -> DocumentFilter {
        match (filter.limit, self.config.max_documents) {
            (None, Some(max)) => filter.limit(max),
            _ => filter,
        }
    }

    /// Apply the cap and the body length floor used by term analyses
    fn term_filter(&self, filter: DocumentFilter) -> DocumentFilter {
        let filter = match self.config.min_body_length {
            0 => filter,
            length => filter.min_body_length(length),
        };
        self.capped(filter)
    }

    /// Archive-wide statistics
    pub async fn archive_stats(&self, session: &dyn ArchiveSession) -> Result<ArchiveStats> {
        let _timer = metrics::start_analysis_timer("stats");
        let result = ArticleRepository::new(session)
            .stats()
            .await
            .map_err(Into::into);
        finish("stats", result)
    }

    /// Article count and mean body length per year
    pub async fn volume_by_year(&self, session: &dyn ArchiveSession) -> Result<Vec<YearVolume>> {
        let _timer = metrics::start_analysis_timer("volume");
        let result = ArticleRepository::new(session)
            .volume_by_year()
            .await
            .map_err(Into::into);
        finish("volume", result)
    }

    /// Terms whose weight grew in `request.target_year` against the prior
    /// `request.comparison_years` years
    ///
    /// The target year and every populated baseline year are loaded by
    /// separate queries, each capped by `max_documents`, so a cap never
    /// drops whole years from the baseline.
    pub async fn emerging_terms(
        &self,
        session: &dyn ArchiveSession,
        request: &EmergingTermsRequest,
    ) -> Result<EmergingTermResult> {
        let _timer = metrics::start_analysis_timer("emerging");
        let result = self.run_emerging(session, request).await;
        finish("emerging", result)
    }

    async fn run_emerging(
        &self,
        session: &dyn ArchiveSession,
        request: &EmergingTermsRequest,
    ) -> Result<EmergingTermResult> {
        request.validate(None)?;
        let extractor = self.config.term_extractor();
        extractor.validate()?;

        let repo = ArticleRepository::new(session);
        let volume = repo.volume_by_year().await?;
        let archive_start = volume.first().map(|v| v.year);
        let window = request.validate(archive_start)?;

        let mut docs = repo
            .documents(&self.term_filter(DocumentFilter::new().year(request.target_year)))
            .await?;
        for year in volume.iter().map(|v| v.year).filter(|y| window.contains(y)) {
            let baseline = repo
                .documents(&self.term_filter(DocumentFilter::new().year(year)))
                .await?;
            docs.extend(baseline);
        }

        tracing::info!(
            target_year = request.target_year,
            baseline_start = *window.start(),
            baseline_end = *window.end(),
            documents = docs.len(),
            "Detecting emerging terms"
        );

        let result = EmergingTermDetector::new(extractor).detect(request, &docs, archive_start)?;
        metrics::record_documents(
            "emerging",
            docs.len().saturating_sub(result.skipped_documents),
            result.skipped_documents,
        );
        Ok(result)
    }

    /// Mean polarity per publication year
    ///
    /// Either bound may be open. The document cap does not apply, so every
    /// year in range is fully represented.
    pub async fn sentiment_by_year<S>(
        &self,
        session: &dyn ArchiveSession,
        start_year: Option<i32>,
        end_year: Option<i32>,
        scorer: &S,
    ) -> Result<SentimentSummary>
    where
        S: SentimentScorer + Sync + ?Sized,
    {
        let _timer = metrics::start_analysis_timer("sentiment");
        let result = async {
            let filter = DocumentFilter {
                start_year,
                end_year,
                ..DocumentFilter::default()
            };
            filter.validate()?;

            let docs = ArticleRepository::new(session).documents(&filter).await?;
            tracing::info!(
                start_year = ?start_year,
                end_year = ?end_year,
                documents = docs.len(),
                "Aggregating sentiment"
            );

            let summary = SentimentAggregator::new().aggregate(&docs, scorer);
            metrics::record_documents(
                "sentiment",
                docs.len().saturating_sub(summary.skipped_documents),
                summary.skipped_documents,
            );
            Ok(summary)
        }
        .await;
        finish("sentiment", result)
    }

    /// Pairwise association scores over the documents matching `filter`
    pub async fn cooccurrences(
        &self,
        session: &dyn ArchiveSession,
        filter: &DocumentFilter,
        config: &CooccurrenceConfig,
    ) -> Result<CooccurrenceResult> {
        let _timer = metrics::start_analysis_timer("cooccurrence");
        let result = async {
            let analyzer = CooccurrenceAnalyzer::new(self.config.tokenization.clone(), config.clone());
            analyzer.validate()?;
            filter.validate()?;

            let docs = self.load(session, self.capped(filter.clone())).await?;
            let result = analyzer.analyze(&docs)?;
            tracing::info!(
                window = %result.window,
                measure = %result.measure,
                pairs = result.pairs.len(),
                "Co-occurrence computed"
            );
            metrics::record_documents("cooccurrence", result.document_count, result.skipped_documents);
            Ok(result)
        }
        .await;
        finish("cooccurrence", result)
    }

    /// Strongest partners of `term` among documents mentioning it
    pub async fn related_terms(
        &self,
        session: &dyn ArchiveSession,
        term: &str,
        year: Option<i32>,
        top_n: usize,
        config: &CooccurrenceConfig,
    ) -> Result<Vec<RelatedTerm>> {
        let _timer = metrics::start_analysis_timer("related");
        let result = async {
            if top_n == 0 {
                return Err(InvalidParameterError::ZeroTopN.into());
            }
            let analyzer = CooccurrenceAnalyzer::new(self.config.tokenization.clone(), config.clone());
            analyzer.validate()?;

            let mut filter = DocumentFilter::new().containing(term.trim());
            if let Some(year) = year {
                filter = filter.year(year);
            }
            let docs = self.load(session, self.capped(filter)).await?;
            let related = analyzer.related(&docs, term, top_n)?;
            tracing::info!(term, year = ?year, related = related.len(), "Related terms computed");
            Ok(related)
        }
        .await;
        finish("related", result)
    }

    /// Top terms of a year range by mean TF-IDF
    pub async fn top_terms(
        &self,
        session: &dyn ArchiveSession,
        start_year: i32,
        end_year: i32,
        top_n: usize,
    ) -> Result<TopTerms> {
        let _timer = metrics::start_analysis_timer("terms");
        let result = async {
            validate_year_range(start_year, end_year)?;
            if top_n == 0 {
                return Err(InvalidParameterError::ZeroTopN.into());
            }
            let extractor = self.config.term_extractor();
            extractor.validate()?;

            let filter = self.term_filter(DocumentFilter::new().years(start_year, end_year));
            let docs = self.load(session, filter).await?;
            let top = extractor.top_terms(&docs, start_year, end_year, top_n)?;
            metrics::record_documents("terms", top.document_count, top.skipped_documents);
            Ok(top)
        }
        .await;
        finish("terms", result)
    }

    /// Most mentioned proper names in one year, titles included
    pub async fn key_actors(
        &self,
        session: &dyn ArchiveSession,
        year: i32,
        top_n: usize,
    ) -> Result<ActorMentions> {
        let _timer = metrics::start_analysis_timer("actors");
        let result = async {
            if top_n == 0 {
                return Err(InvalidParameterError::ZeroTopN.into());
            }
            let docs = self
                .load(session, self.capped(DocumentFilter::new().year(year).with_title()))
                .await?;
            let actors = ActorExtractor::new().extract(&docs, top_n)?;
            metrics::record_documents("actors", actors.document_count, actors.skipped_documents);
            Ok(actors)
        }
        .await;
        finish("actors", result)
    }

    /// Monthly topic coverage and the months that deviate from it
    ///
    /// `topics` defaults to [`Topic::defaults`], `sigma` to the configured
    /// `anomaly_sigma`.
    pub async fn coverage_anomalies(
        &self,
        session: &dyn ArchiveSession,
        topics: Option<Vec<Topic>>,
        sigma: Option<f64>,
    ) -> Result<CoverageReport> {
        let _timer = metrics::start_analysis_timer("coverage");
        let result = async {
            let analyzer = CoverageAnalyzer::new(
                topics.unwrap_or_else(Topic::defaults),
                sigma.unwrap_or(self.config.anomaly_sigma),
            );
            analyzer.validate()?;

            let points = ArticleRepository::new(session)
                .monthly_coverage(analyzer.topics())
                .await?;
            let report = analyzer.detect(points)?;
            tracing::info!(
                months = report.points.len(),
                anomalies = report.anomalies.len(),
                "Coverage anomalies detected"
            );
            Ok(report)
        }
        .await;
        finish("coverage", result)
    }

    async fn load(&self, session: &dyn ArchiveSession, filter: DocumentFilter) -> Result<Vec<Document>> {
        let docs = ArticleRepository::new(session).documents(&filter).await?;
        tracing::debug!(documents = docs.len(), filter = ?filter, "Documents loaded");
        Ok(docs)
    }
}
