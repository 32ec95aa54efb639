//! Documented analysis scenarios over hand-built documents

use alcalor::analytics::{
    AssociationMeasure, CooccurrenceAnalyzer, CooccurrenceConfig, EmergingTermDetector,
    EmergingTermsRequest, NewsAnalyzer, SentimentAggregator, TokenizationPolicy,
};
use alcalor::config::AnalysisConfig;
use alcalor::storage::SqliteArchive;

use super::fixtures::doc;

// ============================================================================
// Emerging terms
// ============================================================================

#[test]
fn test_single_target_document_emerges() {
    let docs = vec![doc(1, 2020, "economía economía economía")];
    let request = EmergingTermsRequest::new(2020).with_comparison_years(2);

    let result = EmergingTermDetector::default()
        .detect(&request, &docs, None)
        .unwrap();

    assert_eq!(result.baseline_start, 2018);
    assert_eq!(result.baseline_end, 2019);
    assert_eq!(result.terms[0].term, "economía");
    assert_eq!(result.terms[0].baseline_weight, 0.0);
    assert!(result.terms[0].growth_score > 0.0);
}

#[tokio::test]
async fn test_single_target_document_emerges_from_archive() {
    let archive = SqliteArchive::in_memory().unwrap();
    archive
        .insert_article(1, "", None, "2020-04-01 09:00:00", "economía economía economía")
        .unwrap();
    let analyzer = NewsAnalyzer::new(AnalysisConfig {
        min_body_length: 0,
        ..AnalysisConfig::default()
    });
    let request = EmergingTermsRequest::new(2020).with_comparison_years(2);

    let result = analyzer.emerging_terms(&archive, &request).await.unwrap();

    assert_eq!(result.baseline_start, 2018);
    assert_eq!(result.baseline_end, 2019);
    assert_eq!(result.baseline_documents, 0);
    assert_eq!(result.terms[0].term, "economía");
    assert_eq!(result.terms[0].baseline_weight, 0.0);
}

#[test]
fn test_empty_target_year_yields_empty_result() {
    let docs = vec![
        doc(1, 2018, "lluvias en el puerto"),
        doc(2, 2019, "lluvias y tráfico"),
    ];
    let request = EmergingTermsRequest::new(2020).with_comparison_years(2);

    let result = EmergingTermDetector::default()
        .detect(&request, &docs, Some(2018))
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.target_documents, 0);
}

#[test]
fn test_new_term_outranks_established_term() {
    let docs = vec![
        doc(1, 2019, "alcalde"),
        doc(2, 2020, "alcalde pandemia"),
    ];
    let request = EmergingTermsRequest::new(2020).with_comparison_years(1);

    let result = EmergingTermDetector::default()
        .detect(&request, &docs, None)
        .unwrap();

    let terms: Vec<&str> = result.terms.iter().map(|t| t.term.as_str()).collect();
    assert_eq!(terms, vec!["pandemia", "alcalde"]);
    assert_eq!(result.terms[0].target_weight, result.terms[1].target_weight);
}

// ============================================================================
// Sentiment
// ============================================================================

#[test]
fn test_opposite_scores_average_to_zero() {
    let docs = vec![doc(1, 2019, "primero"), doc(2, 2019, "segundo")];
    let scorer = |text: &str| if text == "primero" { 0.5 } else { -0.5 };

    let summary = SentimentAggregator::new().aggregate(&docs, &scorer);

    assert_eq!(summary.records.len(), 1);
    assert_eq!(summary.records[0].year, 2019);
    assert_eq!(summary.records[0].mean_polarity, 0.0);
    assert_eq!(summary.records[0].document_count, 2);
}

// ============================================================================
// Co-occurrence
// ============================================================================

#[test]
fn test_single_cooccurring_pair() {
    let docs = vec![doc(1, 2020, "crimen violencia"), doc(2, 2020, "crimen")];
    let config = CooccurrenceConfig {
        vocabulary: Some(vec!["crimen".into(), "violencia".into()]),
        measure: AssociationMeasure::Count,
        ..CooccurrenceConfig::default()
    };

    let result = CooccurrenceAnalyzer::new(TokenizationPolicy::default(), config)
        .analyze(&docs)
        .unwrap();

    assert_eq!(result.pairs.len(), 1);
    let pair = &result.pairs[0];
    assert_eq!(pair.term_a, "crimen");
    assert_eq!(pair.term_b, "violencia");
    assert_eq!(pair.association_score, 1.0);
    assert_eq!(pair.cooccurrence_count, 1);
}
