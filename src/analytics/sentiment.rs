//! Sentiment aggregated by publication year

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::stopwords::{is_negative, is_positive};
use super::text::{TokenizationPolicy, Tokenizer};
use crate::models::Document;

/// Per-document polarity in `[-1, 1]`
///
/// Implementations must be deterministic. Any `Fn(&str) -> f64` is a scorer.
pub trait SentimentScorer {
    fn score(&self, text: &str) -> f64;
}

impl<F> SentimentScorer for F
where
    F: Fn(&str) -> f64,
{
    fn score(&self, text: &str) -> f64 {
        self(text)
    }
}

/// Keyword scorer over the built-in Spanish lexicons
///
/// `(positive - negative) / (positive + negative)` hits, 0.0 without hits.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    tokenizer: Tokenizer,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self {
            tokenizer: Tokenizer::new(TokenizationPolicy {
                remove_stopwords: false,
                min_token_length: 1,
                ..TokenizationPolicy::default()
            }),
        }
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let (positive, negative) =
            self.tokenizer
                .tokenize(text)
                .iter()
                .fold((0u32, 0u32), |(pos, neg), token| {
                    if is_positive(token) {
                        (pos + 1, neg)
                    } else if is_negative(token) {
                        (pos, neg + 1)
                    } else {
                        (pos, neg)
                    }
                });

        let hits = positive + negative;
        if hits == 0 {
            0.0
        } else {
            (f64::from(positive) - f64::from(negative)) / f64::from(hits)
        }
    }
}

/// Sentiment of one publication year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub year: i32,
    pub mean_polarity: f64,
    pub document_count: usize,
    /// Documents scoring above zero
    pub positive_documents: usize,
    /// Documents scoring below zero
    pub negative_documents: usize,
}

impl SentimentRecord {
    /// Percentage of positive documents
    #[must_use]
    pub fn positive_share(&self) -> f64 {
        percentage(self.positive_documents, self.document_count)
    }

    /// Percentage of negative documents
    #[must_use]
    pub fn negative_share(&self) -> f64 {
        percentage(self.negative_documents, self.document_count)
    }

    /// Positive minus negative share, in percentage points
    #[must_use]
    pub fn balance(&self) -> f64 {
        self.positive_share() - self.negative_share()
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Yearly sentiment records, ascending by year
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub records: Vec<SentimentRecord>,
    pub skipped_documents: usize,
}

impl SentimentSummary {
    #[must_use]
    pub fn record(&self, year: i32) -> Option<&SentimentRecord> {
        self.records.iter().find(|r| r.year == year)
    }
}

#[derive(Default)]
struct YearAccumulator {
    sum: f64,
    count: usize,
    positive: usize,
    negative: usize,
}

/// Groups document polarity by publication year
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentAggregator;

impl SentimentAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Score every document and average per year
    ///
    /// Years without documents are omitted. Undecodable documents and
    /// non-finite scores are skipped and counted.
    pub fn aggregate<S>(&self, docs: &[Document], scorer: &S) -> SentimentSummary
    where
        S: SentimentScorer + ?Sized,
    {
        let mut years: BTreeMap<i32, YearAccumulator> = BTreeMap::new();
        let mut skipped = 0;

        for doc in docs {
            let text = match doc.text() {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(document_id = doc.id, error = %e, "Skipping document");
                    skipped += 1;
                    continue;
                }
            };

            let polarity = scorer.score(&text);
            if !polarity.is_finite() {
                tracing::warn!(document_id = doc.id, polarity, "Discarding non-finite score");
                skipped += 1;
                continue;
            }

            let acc = years.entry(doc.year()).or_default();
            acc.sum += polarity;
            acc.count += 1;
            if polarity > 0.0 {
                acc.positive += 1;
            } else if polarity < 0.0 {
                acc.negative += 1;
            }
        }

        let records = years
            .into_iter()
            .map(|(year, acc)| SentimentRecord {
                year,
                mean_polarity: acc.sum / acc.count as f64,
                document_count: acc.count,
                positive_documents: acc.positive,
                negative_documents: acc.negative,
            })
            .collect();

        SentimentSummary {
            records,
            skipped_documents: skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn doc(id: i64, year: i32, text: &str) -> Document {
        let date = NaiveDate::from_ymd_opt(year, 1, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Document::new(id, date, text)
    }

    #[test]
    fn test_mean_of_opposite_scores() {
        let docs = vec![doc(1, 2019, "bueno"), doc(2, 2019, "malo")];
        let scorer = |text: &str| if text == "bueno" { 0.5 } else { -0.5 };

        let summary = SentimentAggregator::new().aggregate(&docs, &scorer);
        assert_eq!(summary.records.len(), 1);
        let record = &summary.records[0];
        assert_eq!(record.year, 2019);
        assert_eq!(record.mean_polarity, 0.0);
        assert_eq!(record.document_count, 2);
        assert_eq!(record.balance(), 0.0);
    }

    #[test]
    fn test_years_sorted_and_gaps_omitted() {
        let docs = vec![doc(1, 2021, "x"), doc(2, 2015, "x"), doc(3, 2017, "x")];
        let summary = SentimentAggregator::new().aggregate(&docs, &|_: &str| 0.25);
        let years: Vec<i32> = summary.records.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2015, 2017, 2021]);
        assert!(summary.record(2016).is_none());
    }

    #[test]
    fn test_non_finite_and_invalid_documents_skipped() {
        let date = NaiveDate::from_ymd_opt(2019, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let docs = vec![
            doc(1, 2019, "nan"),
            doc(2, 2019, "ok"),
            Document::from_bytes(3, date, vec![0xc0]),
        ];
        let scorer = |text: &str| if text == "nan" { f64::NAN } else { 1.0 };

        let summary = SentimentAggregator::new().aggregate(&docs, &scorer);
        assert_eq!(summary.skipped_documents, 2);
        assert_eq!(summary.records[0].document_count, 1);
        assert_eq!(summary.records[0].positive_share(), 100.0);
    }

    #[test]
    fn test_lexicon_scorer() {
        let scorer = LexiconScorer::default();
        assert_eq!(scorer.score("Gran éxito en la inauguración"), 1.0);
        assert_eq!(scorer.score("Violencia y crimen en el puerto"), -1.0);
        assert_eq!(scorer.score("Acuerdo tras la crisis"), 0.0);
        assert_eq!(scorer.score("Sesión ordinaria del cabildo"), 0.0);
    }
}
