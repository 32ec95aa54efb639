//! Tabular views of analysis results
//!
//! Every result converts into a [`Table`] of JSON scalars, the shape report
//! consumers and the CLI work with.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::analytics::terms::TopTerms;
use crate::analytics::{
    ActorMentions, CooccurrenceResult, CoverageReport, EmergingTermResult, RelatedTerm,
    SentimentSummary,
};
use crate::models::{ArchiveStats, YearVolume};
use crate::utils::{normalize_whitespace, truncate_text};

/// Longest cell shown by [`Table::to_text`]
const MAX_TEXT_CELL: usize = 60;

/// Named columns and rows of scalar cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    #[must_use]
    pub fn new(title: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            title: title.into(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; cells beyond the column count are dropped, missing
    /// cells are null
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as display strings
    #[must_use]
    pub fn formatted_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(format_cell).collect())
            .collect()
    }

    /// Render as aligned plain text; long cells are truncated
    #[must_use]
    pub fn to_text(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .formatted_rows()
            .into_iter()
            .map(|row| row.iter().map(|c| truncate_text(c, MAX_TEXT_CELL)).collect())
            .collect();
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let pad = width.saturating_sub(cell.chars().count());
                    format!("{cell}{}", " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = format!("{}\n", self.title);
        out.push_str(&line(self.columns.as_slice()));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&line(rule.as_slice()));
        out.push('\n');
        if rows.is_empty() {
            out.push_str("(no rows)\n");
        }
        for row in &rows {
            out.push_str(&line(row.as_slice()));
            out.push('\n');
        }
        out
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => normalize_whitespace(s),
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(|f| format!("{f:.4}"))
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

/// Non-finite floats become null
fn float(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

impl From<&ArchiveStats> for Table {
    fn from(stats: &ArchiveStats) -> Self {
        let date = |d: Option<chrono::NaiveDateTime>| {
            d.map_or(Value::Null, |d| json!(d.format("%Y-%m-%d").to_string()))
        };
        let mut table = Table::new("Archive statistics", &["metric", "value"]);
        table.push_row(vec![json!("total_articles"), json!(stats.total_articles)]);
        table.push_row(vec![json!("earliest_date"), date(stats.earliest)]);
        table.push_row(vec![json!("latest_date"), date(stats.latest)]);
        table.push_row(vec![json!("unique_sections"), json!(stats.unique_sections)]);
        table.push_row(vec![json!("avg_body_length"), float(stats.avg_body_length)]);
        table
    }
}

impl From<&[YearVolume]> for Table {
    fn from(volume: &[YearVolume]) -> Self {
        let mut table = Table::new("Articles per year", &["year", "articles", "avg_length"]);
        for v in volume {
            table.push_row(vec![json!(v.year), json!(v.articles), float(v.avg_length)]);
        }
        table
    }
}

impl From<&EmergingTermResult> for Table {
    fn from(result: &EmergingTermResult) -> Self {
        let mut table = Table::new(
            format!(
                "Emerging terms {} vs {}-{} ({})",
                result.target_year, result.baseline_start, result.baseline_end, result.weighting
            ),
            &["term", "growth_score", "baseline_weight", "target_weight"],
        );
        for t in &result.terms {
            table.push_row(vec![
                json!(t.term),
                float(t.growth_score),
                float(t.baseline_weight),
                float(t.target_weight),
            ]);
        }
        table
    }
}

impl From<&SentimentSummary> for Table {
    fn from(summary: &SentimentSummary) -> Self {
        let mut table = Table::new(
            "Sentiment by year",
            &[
                "year",
                "mean_polarity",
                "document_count",
                "positive_share",
                "negative_share",
                "balance",
            ],
        );
        for r in &summary.records {
            table.push_row(vec![
                json!(r.year),
                float(r.mean_polarity),
                json!(r.document_count),
                float(r.positive_share()),
                float(r.negative_share()),
                float(r.balance()),
            ]);
        }
        table
    }
}

impl From<&CooccurrenceResult> for Table {
    fn from(result: &CooccurrenceResult) -> Self {
        let mut table = Table::new(
            format!("Co-occurrence ({} window, {})", result.window, result.measure),
            &["term_a", "term_b", "cooccurrence_count", "association_score"],
        );
        for p in &result.pairs {
            table.push_row(vec![
                json!(p.term_a),
                json!(p.term_b),
                json!(p.cooccurrence_count),
                float(p.association_score),
            ]);
        }
        table
    }
}

impl From<&[RelatedTerm]> for Table {
    fn from(related: &[RelatedTerm]) -> Self {
        let mut table = Table::new(
            "Related terms",
            &["term", "cooccurrence_count", "association_score"],
        );
        for r in related {
            table.push_row(vec![
                json!(r.term),
                json!(r.cooccurrence_count),
                float(r.association_score),
            ]);
        }
        table
    }
}

impl From<&TopTerms> for Table {
    fn from(top: &TopTerms) -> Self {
        let mut table = Table::new(
            format!("Top terms {}-{}", top.start_year, top.end_year),
            &["term", "tfidf"],
        );
        for t in &top.terms {
            table.push_row(vec![json!(t.term), float(t.score)]);
        }
        table
    }
}

impl From<&ActorMentions> for Table {
    fn from(actors: &ActorMentions) -> Self {
        let mut table = Table::new("Key actors", &["name", "mentions"]);
        for a in &actors.actors {
            table.push_row(vec![json!(a.name), json!(a.mentions)]);
        }
        table
    }
}

impl From<&CoverageReport> for Table {
    fn from(report: &CoverageReport) -> Self {
        let mut table = Table::new(
            "Coverage anomalies",
            &["topic", "month", "share", "mean", "z_score", "direction"],
        );
        for a in &report.anomalies {
            table.push_row(vec![
                json!(a.topic),
                json!(a.month),
                float(a.share),
                float(a.mean),
                float(a.z_score),
                json!(a.direction.to_string()),
            ]);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{EmergingTerm, SentimentRecord, WeightingMode};

    #[test]
    fn test_push_row_pads_and_truncates() {
        let mut table = Table::new("t", &["a", "b"]);
        table.push_row(vec![json!(1)]);
        table.push_row(vec![json!(1), json!(2), json!(3)]);
        assert_eq!(table.rows[0], vec![json!(1), Value::Null]);
        assert_eq!(table.rows[1].len(), 2);
    }

    #[test]
    fn test_text_rendering_aligns_columns() {
        let mut table = Table::new("Key actors", &["name", "mentions"]);
        table.push_row(vec![json!("Cuitláhuac García"), json!(12)]);
        table.push_row(vec![json!("Ana Li"), json!(3)]);

        let text = table.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Key actors");
        assert_eq!(lines[1], "name               mentions");
        assert_eq!(lines[3], "Cuitláhuac García  12");
        assert_eq!(lines[4], "Ana Li             3");
    }

    #[test]
    fn test_text_cells_are_flattened_and_truncated() {
        let mut table = Table::new("t", &["body"]);
        table.push_row(vec![json!("línea uno\nlínea   dos")]);
        table.push_row(vec![json!("x".repeat(100))]);

        let rows = table.formatted_rows();
        assert_eq!(rows[0][0], "línea uno línea dos");

        let text = table.to_text();
        let last = text.lines().last().unwrap();
        assert_eq!(last.chars().count(), MAX_TEXT_CELL);
        assert!(last.ends_with("..."));
    }

    #[test]
    fn test_empty_table_text() {
        let table = Table::new("Empty", &["x"]);
        assert!(table.to_text().contains("(no rows)"));
    }

    #[test]
    fn test_emerging_table() {
        let result = EmergingTermResult {
            target_year: 2020,
            baseline_start: 2018,
            baseline_end: 2019,
            weighting: WeightingMode::Tf,
            terms: vec![EmergingTerm {
                term: "economía".into(),
                growth_score: 1e6,
                baseline_weight: 0.0,
                target_weight: 1.0,
            }],
            target_documents: 1,
            baseline_documents: 0,
            skipped_documents: 0,
        };
        let table = Table::from(&result);
        assert_eq!(table.title, "Emerging terms 2020 vs 2018-2019 (tf)");
        assert_eq!(table.columns.len(), 4);
        assert_eq!(table.formatted_rows()[0][0], "economía");
        assert_eq!(table.formatted_rows()[0][2], "0.0000");
    }

    #[test]
    fn test_sentiment_table_shares() {
        let summary = SentimentSummary {
            records: vec![SentimentRecord {
                year: 2019,
                mean_polarity: 0.0,
                document_count: 4,
                positive_documents: 1,
                negative_documents: 2,
            }],
            skipped_documents: 0,
        };
        let table = Table::from(&summary);
        assert_eq!(table.rows[0][3], json!(25.0));
        assert_eq!(table.rows[0][5], json!(-25.0));
    }

    #[test]
    fn test_non_finite_becomes_null() {
        assert_eq!(float(f64::NAN), Value::Null);
        assert_eq!(format_cell(&Value::Null), "-");
    }
}
