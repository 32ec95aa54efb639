//! Archive -> analysis -> table/report flows on SQLite

use alcalor::analytics::{
    CooccurrenceConfig, EmergingTermsRequest, LexiconScorer, NewsAnalyzer, WeightingMode,
};
use alcalor::config::AnalysisConfig;
use alcalor::report::{Report, ReportWriter, Table};
use alcalor::storage::{DocumentFilter, SqliteArchive};
use tempfile::TempDir;

use super::fixtures::{sample_archive, SAMPLE_ARTICLES};

fn analyzer() -> NewsAnalyzer {
    NewsAnalyzer::new(AnalysisConfig {
        min_body_length: 0,
        ..AnalysisConfig::default()
    })
}

#[tokio::test]
async fn test_archive_overview() {
    let archive = sample_archive();
    let analyzer = analyzer();

    let stats = analyzer.archive_stats(&archive).await.unwrap();
    assert_eq!(stats.total_articles, SAMPLE_ARTICLES.len() as u64);
    assert_eq!(stats.unique_sections, 4);
    assert_eq!(stats.first_year(), Some(2017));
    assert_eq!(stats.last_year(), Some(2020));

    let volume = analyzer.volume_by_year(&archive).await.unwrap();
    let per_year: Vec<(i32, u64)> = volume.iter().map(|v| (v.year, v.articles)).collect();
    assert_eq!(per_year, vec![(2017, 1), (2018, 2), (2019, 1), (2020, 2)]);
}

#[tokio::test]
async fn test_emerging_terms_from_archive() {
    let archive = sample_archive();
    let request = EmergingTermsRequest::new(2020)
        .with_comparison_years(2)
        .with_top_n(5)
        .with_weighting(WeightingMode::Tf);

    let result = analyzer().emerging_terms(&archive, &request).await.unwrap();

    assert_eq!(result.target_documents, 2);
    assert_eq!(result.baseline_documents, 3);
    assert!(result.len() <= 5);
    assert_eq!(result.terms[0].term, "pandemia");
    assert_eq!(result.terms[0].baseline_weight, 0.0);
}

#[tokio::test]
async fn test_body_length_floor_applies_to_term_analyses() {
    let archive = sample_archive();
    let analyzer = NewsAnalyzer::new(AnalysisConfig {
        min_body_length: 10_000,
        ..AnalysisConfig::default()
    });
    let request = EmergingTermsRequest::new(2020).with_comparison_years(2);

    let result = analyzer.emerging_terms(&archive, &request).await.unwrap();
    assert!(result.is_empty());

    // Sentiment is not subject to the floor
    let summary = analyzer
        .sentiment_by_year(&archive, None, None, &LexiconScorer::default())
        .await
        .unwrap();
    assert_eq!(summary.records.len(), 4);
}

#[tokio::test]
async fn test_sentiment_by_year_from_archive() {
    let archive = sample_archive();
    let summary = analyzer()
        .sentiment_by_year(&archive, Some(2018), Some(2020), &LexiconScorer::default())
        .await
        .unwrap();

    let years: Vec<i32> = summary.records.iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2018, 2019, 2020]);
    for record in &summary.records {
        assert!((-1.0..=1.0).contains(&record.mean_polarity));
    }
    assert_eq!(summary.record(2018).unwrap().document_count, 2);
}

#[tokio::test]
async fn test_related_terms_exclude_focus() {
    let archive = sample_archive();
    let related = analyzer()
        .related_terms(&archive, "violencia", None, 10, &CooccurrenceConfig::default())
        .await
        .unwrap();

    assert!(!related.is_empty());
    assert!(related.iter().all(|r| r.term != "violencia"));
    assert!(related.iter().any(|r| r.term == "seguridad"));
}

#[tokio::test]
async fn test_cooccurrence_for_one_year() {
    let archive = sample_archive();
    let result = analyzer()
        .cooccurrences(
            &archive,
            &DocumentFilter::new().year(2020),
            &CooccurrenceConfig::default(),
        )
        .await
        .unwrap();

    assert_eq!(result.document_count, 2);
    assert!(result.pair("pandemia", "vacunas").is_some());
    for pair in &result.pairs {
        assert!(pair.term_a < pair.term_b);
    }
}

#[tokio::test]
async fn test_coverage_months() {
    let archive = sample_archive();
    let report = analyzer()
        .coverage_anomalies(&archive, None, None)
        .await
        .unwrap();

    assert_eq!(report.points.len(), SAMPLE_ARTICLES.len());
    assert_eq!(report.points[0].month, "2017-09");
    assert_eq!(report.topics.len(), 5);
}

#[tokio::test]
async fn test_html_report_from_results() {
    let archive = sample_archive();
    let analyzer = analyzer();
    let dir = TempDir::new().unwrap();

    let mut report = Report::new("Al Calor Político: 2020");
    let stats = analyzer.archive_stats(&archive).await.unwrap();
    report.push(&stats);
    let emerging = analyzer
        .emerging_terms(&archive, &EmergingTermsRequest::new(2020).with_comparison_years(2))
        .await
        .unwrap();
    report.push(&emerging);
    let actors = analyzer.key_actors(&archive, 2020, 5).await.unwrap();
    report.push(&actors);

    let writer = ReportWriter::new(dir.path()).unwrap();
    let path = writer
        .save(&report, std::path::Path::new("report.html"))
        .unwrap();
    let html = std::fs::read_to_string(path).unwrap();

    assert!(html.contains("Emerging terms 2020 vs 2018-2019 (tf)"));
    assert!(html.contains("Cuitláhuac García"));
    assert!(html.contains("pandemia"));
}

#[tokio::test]
async fn test_table_json_shape() {
    let archive = sample_archive();
    let actors = analyzer().key_actors(&archive, 2019, 3).await.unwrap();

    let json = serde_json::to_value(Table::from(&actors)).unwrap();
    assert_eq!(json["columns"], serde_json::json!(["name", "mentions"]));
    assert_eq!(json["rows"][0][0], "Cuitláhuac García");
}

#[tokio::test]
async fn test_sqlite_archive_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshots").join("archive.db");

    {
        let archive = SqliteArchive::open(&path).unwrap();
        archive
            .insert_article(1, "Nota", Some("estado"), "2021-05-05 10:00:00", "Texto breve")
            .unwrap();
    }

    let archive = SqliteArchive::open(&path).unwrap();
    let stats = analyzer().archive_stats(&archive).await.unwrap();
    assert_eq!(stats.total_articles, 1);
    assert_eq!(stats.first_year(), Some(2021));
}
