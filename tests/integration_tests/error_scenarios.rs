//! Error scenario integration tests
//!
//! Tests various failure modes and error handling:
//! 1. Query failures surface unmodified
//! 2. Invalid parameters are rejected before any query
//! 3. Undecodable documents are skipped and counted

use std::sync::atomic::{AtomicUsize, Ordering};

use alcalor::analytics::{
    CooccurrenceConfig, EmergingTermDetector, EmergingTermsRequest, InvalidParameterError,
    LexiconScorer, NewsAnalyzer, SentimentAggregator,
};
use alcalor::error::{AlcalorErrorTrait, Error, ErrorCategory};
use alcalor::storage::{ArchiveSession, Dialect, Param, QueryError, ResultSet};
use async_trait::async_trait;

use super::fixtures::doc;

/// Session that counts queries and fails every one of them
#[derive(Default)]
struct FailingSession {
    queries: AtomicUsize,
}

#[async_trait]
impl ArchiveSession for FailingSession {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn query(&self, _sql: &str, _params: &[Param]) -> Result<ResultSet, QueryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Err(QueryError::Connection("connection refused".into()))
    }
}

// ============================================================================
// Query Errors
// ============================================================================

#[tokio::test]
async fn test_query_error_surfaces_unmodified() {
    let session = FailingSession::default();
    let err = NewsAnalyzer::default()
        .sentiment_by_year(&session, None, None, &LexiconScorer::default())
        .await
        .unwrap_err();

    match &err {
        Error::Query(QueryError::Connection(msg)) => assert_eq!(msg, "connection refused"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.category(), ErrorCategory::Query);
    assert!(err.is_recoverable());
    assert_eq!(session.queries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_query_error_in_emerging() {
    let session = FailingSession::default();
    let err = NewsAnalyzer::default()
        .emerging_terms(&session, &EmergingTermsRequest::new(2020))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Query(_)));
}

// ============================================================================
// Parameter Errors
// ============================================================================

#[tokio::test]
async fn test_invalid_parameters_issue_no_queries() {
    let session = FailingSession::default();
    let analyzer = NewsAnalyzer::default();

    let err = analyzer
        .emerging_terms(&session, &EmergingTermsRequest::new(2020).with_comparison_years(0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidParameter(InvalidParameterError::ZeroComparisonYears)
    ));

    let err = analyzer.top_terms(&session, 2021, 2019, 10).await.unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidParameter(InvalidParameterError::InvertedYearRange { start: 2021, end: 2019 })
    ));

    let err = analyzer
        .related_terms(&session, "crimen", None, 0, &CooccurrenceConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameter(InvalidParameterError::ZeroTopN)));

    let err = analyzer.key_actors(&session, 2020, 0).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parameter);
    assert!(!err.is_recoverable());

    let config = CooccurrenceConfig {
        top_k: 0,
        ..CooccurrenceConfig::default()
    };
    let err = analyzer
        .cooccurrences(&session, &Default::default(), &config)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameter(_)));

    assert_eq!(session.queries.load(Ordering::SeqCst), 0);
}

#[test]
fn test_window_before_archive_start() {
    let request = EmergingTermsRequest::new(2010).with_comparison_years(2);
    let err = EmergingTermDetector::default()
        .detect(&request, &[], Some(2011))
        .unwrap_err();

    assert_eq!(
        err,
        InvalidParameterError::NoBaseline {
            target_year: 2010,
            comparison_years: 2,
            archive_start: 2011,
        }
    );
}

#[test]
fn test_window_partly_before_archive_start_is_allowed() {
    let request = EmergingTermsRequest::new(2011).with_comparison_years(3);
    let docs = vec![doc(1, 2010, "lluvias"), doc(2, 2011, "lluvias inundación")];

    let result = EmergingTermDetector::default()
        .detect(&request, &docs, Some(2010))
        .unwrap();
    assert_eq!(result.baseline_start, 2008);
    assert_eq!(result.terms[0].term, "inundación");
}

#[test]
fn test_window_overflow() {
    let request = EmergingTermsRequest::new(i32::MIN + 1).with_comparison_years(5);
    assert!(matches!(
        request.validate(None),
        Err(InvalidParameterError::WindowOutOfRange { .. })
    ));
}

// ============================================================================
// Tokenization Errors
// ============================================================================

fn broken(id: i64, year: i32) -> alcalor::models::Document {
    let date = chrono::NaiveDate::from_ymd_opt(year, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    alcalor::models::Document::from_bytes(id, date, vec![0xc3, 0x28])
}

#[test]
fn test_undecodable_documents_are_skipped() {
    let docs = vec![
        doc(1, 2019, "primero"),
        broken(2, 2019),
        doc(3, 2020, "tercero"),
    ];

    let summary = SentimentAggregator::new().aggregate(&docs, &|_: &str| 0.25);
    assert_eq!(summary.skipped_documents, 1);
    assert_eq!(summary.record(2019).unwrap().document_count, 1);

    let request = EmergingTermsRequest::new(2020).with_comparison_years(1);
    let result = EmergingTermDetector::default()
        .detect(&request, &docs, None)
        .unwrap();
    assert_eq!(result.skipped_documents, 1);
    assert_eq!(result.terms[0].term, "tercero");
}

#[tokio::test]
async fn test_undecodable_row_from_archive() {
    let archive = alcalor::storage::SqliteArchive::in_memory().unwrap();
    archive
        .insert_article(1, "", None, "2019-01-01", "texto válido")
        .unwrap();
    archive
        .insert_article_bytes(2, "2019-02-01", &[0xff, 0xfe, 0x00])
        .unwrap();

    let summary = NewsAnalyzer::default()
        .sentiment_by_year(&archive, None, None, &LexiconScorer::default())
        .await
        .unwrap();
    assert_eq!(summary.skipped_documents, 1);
    assert_eq!(summary.record(2019).unwrap().document_count, 1);
}
