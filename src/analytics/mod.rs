//! NLP analytics over the news archive
//!
//! Every analysis here is a pure function of the documents it is given:
//! - [`terms`] - weighted term vectors per year (count, tf, tf-idf)
//! - [`emerging`] - terms whose weight grew against a baseline window
//! - [`sentiment`] - polarity aggregated by publication year
//! - [`cooccurrence`] - sparse term-pair association scores
//! - [`actors`] - frequently named people and organizations
//! - [`coverage`] - monthly topic coverage and its anomalies
//!
//! [`service`] wires these to an archive session.

pub mod actors;
pub mod cooccurrence;
pub mod coverage;
pub mod emerging;
pub mod sentiment;
pub mod service;
pub mod stopwords;
pub mod terms;
pub mod text;

use thiserror::Error;

pub use actors::{ActorExtractor, ActorMention, ActorMentions};
pub use cooccurrence::{
    AssociationMeasure, CooccurrenceAnalyzer, CooccurrenceConfig, CooccurrencePair,
    CooccurrenceResult, CooccurrenceWindow, RelatedTerm,
};
pub use coverage::{
    AnomalyDirection, CoverageAnalyzer, CoverageAnomaly, CoveragePoint, CoverageReport, Topic,
};
pub use emerging::{EmergingTerm, EmergingTermDetector, EmergingTermResult, EmergingTermsRequest};
pub use sentiment::{
    LexiconScorer, SentimentAggregator, SentimentRecord, SentimentScorer, SentimentSummary,
};
pub use service::NewsAnalyzer;
pub use terms::{TermExtraction, TermExtractor, TermScore, TermVector, WeightingMode};
pub use text::{TokenizationPolicy, Tokenizer};

/// Per-document failure to turn text into tokens
///
/// Never aborts a batch: the document is skipped and counted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizationError {
    #[error("document {document_id}: body is not valid UTF-8")]
    InvalidEncoding { document_id: i64 },
}

/// Malformed analysis request, rejected before any query runs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidParameterError {
    #[error("top_n must be at least 1")]
    ZeroTopN,

    #[error("comparison_years must be at least 1")]
    ZeroComparisonYears,

    #[error(
        "target year {target_year} has no baseline: it precedes the archive, which \
         starts in {archive_start} ({comparison_years}-year window requested)"
    )]
    NoBaseline {
        target_year: i32,
        comparison_years: u32,
        archive_start: i32,
    },

    #[error("baseline window of {comparison_years} years before {target_year} is out of range")]
    WindowOutOfRange {
        target_year: i32,
        comparison_years: u32,
    },

    #[error("invalid year range: {start} is after {end}")]
    InvertedYearRange { start: i32, end: i32 },

    #[error("invalid {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Result type for pure analytics operations
pub type AnalysisResult<T> = Result<T, InvalidParameterError>;

/// Check an inclusive year range
pub fn validate_year_range(start: i32, end: i32) -> AnalysisResult<()> {
    if start > end {
        return Err(InvalidParameterError::InvertedYearRange { start, end });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_range_validation() {
        assert!(validate_year_range(2010, 2012).is_ok());
        assert!(validate_year_range(2012, 2012).is_ok());
        assert_eq!(
            validate_year_range(2013, 2012),
            Err(InvalidParameterError::InvertedYearRange {
                start: 2013,
                end: 2012
            })
        );
    }

    #[test]
    fn test_error_messages() {
        let err = InvalidParameterError::NoBaseline {
            target_year: 2004,
            comparison_years: 2,
            archive_start: 2004,
        };
        assert!(err.to_string().contains("2004"));
        assert_eq!(
            TokenizationError::InvalidEncoding { document_id: 4 }.to_string(),
            "document 4: body is not valid UTF-8"
        );
    }
}
