//! Term co-occurrence with count, PMI and NPMI association
//!
//! A window is either a whole document or a sentence. Two terms co-occur
//! when both appear in the same window; each window counts once per pair.
//! Pairs are unordered and stored with `term_a < term_b`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::text::{TokenizationPolicy, Tokenizer};
use super::{AnalysisResult, InvalidParameterError};
use crate::models::Document;

pub const DEFAULT_TOP_K: usize = 50;

/// Unit of text within which terms co-occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CooccurrenceWindow {
    #[default]
    Document,
    Sentence,
}

impl fmt::Display for CooccurrenceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => f.write_str("document"),
            Self::Sentence => f.write_str("sentence"),
        }
    }
}

impl FromStr for CooccurrenceWindow {
    type Err = InvalidParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "document" | "doc" => Ok(Self::Document),
            "sentence" => Ok(Self::Sentence),
            other => Err(InvalidParameterError::InvalidValue {
                name: "window",
                value: other.to_string(),
            }),
        }
    }
}

/// Association score of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssociationMeasure {
    /// Number of windows containing both terms
    #[default]
    Count,
    /// Pointwise mutual information
    Pmi,
    /// PMI normalized to `[-1, 1]`
    Npmi,
}

impl fmt::Display for AssociationMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => f.write_str("count"),
            Self::Pmi => f.write_str("pmi"),
            Self::Npmi => f.write_str("npmi"),
        }
    }
}

impl FromStr for AssociationMeasure {
    type Err = InvalidParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "count" => Ok(Self::Count),
            "pmi" => Ok(Self::Pmi),
            "npmi" => Ok(Self::Npmi),
            other => Err(InvalidParameterError::InvalidValue {
                name: "measure",
                value: other.to_string(),
            }),
        }
    }
}

/// PMI(a,b) = log2(P(a,b) / (P(a) * P(b))), zero when any probability is zero
#[must_use]
pub fn pointwise_mutual_information(p_a: f64, p_b: f64, p_ab: f64) -> f64 {
    if p_a > 0.0 && p_b > 0.0 && p_ab > 0.0 {
        (p_ab / (p_a * p_b)).log2()
    } else {
        0.0
    }
}

/// PMI divided by `-log2 P(a,b)`; 1.0 when the pair is in every window
#[must_use]
pub fn normalized_pmi(p_a: f64, p_b: f64, p_ab: f64) -> f64 {
    if p_ab >= 1.0 {
        return 1.0;
    }
    if p_ab <= 0.0 {
        return 0.0;
    }
    pointwise_mutual_information(p_a, p_b, p_ab) / -p_ab.log2()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooccurrenceConfig {
    pub window: CooccurrenceWindow,
    pub measure: AssociationMeasure,
    /// Vocabulary size when none is given
    pub top_k: usize,
    /// Pairs co-occurring in fewer windows are dropped
    pub min_count: u64,
    /// Explicit vocabulary, normalized with the tokenization policy
    pub vocabulary: Option<Vec<String>>,
}

impl Default for CooccurrenceConfig {
    fn default() -> Self {
        Self {
            window: CooccurrenceWindow::Document,
            measure: AssociationMeasure::Count,
            top_k: DEFAULT_TOP_K,
            min_count: 1,
            vocabulary: None,
        }
    }
}

/// Association between two distinct terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooccurrencePair {
    pub term_a: String,
    pub term_b: String,
    pub cooccurrence_count: u64,
    pub association_score: f64,
}

impl CooccurrencePair {
    /// Build a pair, ordering the terms lexically
    #[must_use]
    pub fn new(x: &str, y: &str, cooccurrence_count: u64, association_score: f64) -> Self {
        let (a, b) = if x <= y { (x, y) } else { (y, x) };
        Self {
            term_a: a.to_string(),
            term_b: b.to_string(),
            cooccurrence_count,
            association_score,
        }
    }

    /// The other term of the pair, if `term` is part of it
    #[must_use]
    pub fn partner_of(&self, term: &str) -> Option<&str> {
        if self.term_a == term {
            Some(&self.term_b)
        } else if self.term_b == term {
            Some(&self.term_a)
        } else {
            None
        }
    }
}

/// A partner of a focal term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedTerm {
    pub term: String,
    pub cooccurrence_count: u64,
    pub association_score: f64,
}

fn score_order(score_a: f64, count_a: u64, score_b: f64, count_b: u64) -> Ordering {
    score_b
        .partial_cmp(&score_a)
        .unwrap_or(Ordering::Equal)
        .then_with(|| count_b.cmp(&count_a))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooccurrenceResult {
    pub window: CooccurrenceWindow,
    pub measure: AssociationMeasure,
    pub vocabulary: Vec<String>,
    /// Ordered by score desc, count desc, then terms
    pub pairs: Vec<CooccurrencePair>,
    pub window_count: usize,
    pub document_count: usize,
    pub skipped_documents: usize,
}

impl CooccurrenceResult {
    #[must_use]
    pub fn pair(&self, x: &str, y: &str) -> Option<&CooccurrencePair> {
        let (a, b) = if x <= y { (x, y) } else { (y, x) };
        self.pairs.iter().find(|p| p.term_a == a && p.term_b == b)
    }

    /// Strongest partners of `term` among the computed pairs
    #[must_use]
    pub fn related(&self, term: &str, top_n: usize) -> Vec<RelatedTerm> {
        let mut related: Vec<RelatedTerm> = self
            .pairs
            .iter()
            .filter_map(|pair| {
                pair.partner_of(term).map(|partner| RelatedTerm {
                    term: partner.to_string(),
                    cooccurrence_count: pair.cooccurrence_count,
                    association_score: pair.association_score,
                })
            })
            .collect();

        related.sort_by(|a, b| {
            score_order(
                a.association_score,
                a.cooccurrence_count,
                b.association_score,
                b.cooccurrence_count,
            )
            .then_with(|| a.term.cmp(&b.term))
        });
        related.truncate(top_n);
        related
    }
}

#[derive(Debug, Clone, Default)]
pub struct CooccurrenceAnalyzer {
    tokenizer: Tokenizer,
    config: CooccurrenceConfig,
}

impl CooccurrenceAnalyzer {
    #[must_use]
    pub fn new(policy: TokenizationPolicy, config: CooccurrenceConfig) -> Self {
        Self {
            tokenizer: Tokenizer::new(policy),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CooccurrenceConfig {
        &self.config
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        self.tokenizer.policy().validate()?;
        if self.config.top_k == 0 {
            return Err(InvalidParameterError::InvalidValue {
                name: "top_k",
                value: "0".to_string(),
            });
        }
        if self.config.min_count == 0 {
            return Err(InvalidParameterError::InvalidValue {
                name: "min_count",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Term lists of every window, plus the decoded document count and
    /// the number of skipped documents
    fn windows(&self, docs: &[Document]) -> (Vec<Vec<String>>, usize, usize) {
        let mut windows = Vec::new();
        let mut decoded = 0;
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
            decoded += 1;

            match self.config.window {
                CooccurrenceWindow::Document => windows.push(self.tokenizer.tokenize(&text)),
                CooccurrenceWindow::Sentence => {
                    windows.extend(self.tokenizer.tokenize_sentences(&text));
                }
            }
        }
        (windows, decoded, skipped)
    }

    /// Explicit vocabulary, or the `top_k` most frequent terms
    fn vocabulary(&self, windows: &[Vec<String>], focus: Option<&str>) -> BTreeSet<String> {
        let mut vocabulary: BTreeSet<String> = match &self.config.vocabulary {
            Some(terms) => terms
                .iter()
                .filter_map(|t| self.tokenizer.normalize_term(t))
                .collect(),
            None => {
                let mut occurrences: HashMap<&str, u64> = HashMap::new();
                for term in windows.iter().flatten() {
                    *occurrences.entry(term.as_str()).or_insert(0) += 1;
                }
                let mut ranked: Vec<(&str, u64)> = occurrences.into_iter().collect();
                ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                ranked
                    .into_iter()
                    .take(self.config.top_k)
                    .map(|(term, _)| term.to_string())
                    .collect()
            }
        };

        if let Some(focus) = focus {
            vocabulary.insert(focus.to_string());
        }
        vocabulary
    }

    fn compute(&self, docs: &[Document], focus: Option<&str>) -> CooccurrenceResult {
        let (windows, document_count, skipped_documents) = self.windows(docs);
        let vocabulary = self.vocabulary(&windows, focus);

        let mut term_windows: HashMap<&str, u64> = HashMap::new();
        let mut pair_windows: BTreeMap<(&str, &str), u64> = BTreeMap::new();

        for window in &windows {
            let present: BTreeSet<&str> = window
                .iter()
                .map(String::as_str)
                .filter(|t| vocabulary.contains(*t))
                .collect();
            let present: Vec<&str> = present.into_iter().collect();

            for (i, &a) in present.iter().enumerate() {
                *term_windows.entry(a).or_insert(0) += 1;
                for &b in &present[i + 1..] {
                    *pair_windows.entry((a, b)).or_insert(0) += 1;
                }
            }
        }

        let n = windows.len() as f64;
        let mut pairs: Vec<CooccurrencePair> = pair_windows
            .into_iter()
            .filter(|(_, count)| *count >= self.config.min_count)
            .map(|((a, b), count)| {
                let p_a = term_windows[a] as f64 / n;
                let p_b = term_windows[b] as f64 / n;
                let p_ab = count as f64 / n;
                let score = match self.config.measure {
                    AssociationMeasure::Count => count as f64,
                    AssociationMeasure::Pmi => pointwise_mutual_information(p_a, p_b, p_ab),
                    AssociationMeasure::Npmi => normalized_pmi(p_a, p_b, p_ab),
                };
                CooccurrencePair::new(a, b, count, score)
            })
            .collect();

        pairs.sort_by(|x, y| {
            score_order(
                x.association_score,
                x.cooccurrence_count,
                y.association_score,
                y.cooccurrence_count,
            )
            .then_with(|| x.term_a.cmp(&y.term_a))
            .then_with(|| x.term_b.cmp(&y.term_b))
        });

        tracing::debug!(
            windows = windows.len(),
            vocabulary = vocabulary.len(),
            pairs = pairs.len(),
            measure = %self.config.measure,
            "Computed co-occurrences"
        );

        CooccurrenceResult {
            window: self.config.window,
            measure: self.config.measure,
            vocabulary: vocabulary.into_iter().collect(),
            pairs,
            window_count: windows.len(),
            document_count,
            skipped_documents,
        }
    }

    /// Association scores for every co-occurring vocabulary pair
    pub fn analyze(&self, docs: &[Document]) -> AnalysisResult<CooccurrenceResult> {
        self.validate()?;
        Ok(self.compute(docs, None))
    }

    /// Strongest partners of `term`
    ///
    /// The focal term is normalized like document text and always added to
    /// the vocabulary. A term that normalizes to nothing has no partners.
    pub fn related(
        &self,
        docs: &[Document],
        term: &str,
        top_n: usize,
    ) -> AnalysisResult<Vec<RelatedTerm>> {
        self.validate()?;
        if top_n == 0 {
            return Err(InvalidParameterError::ZeroTopN);
        }
        let Some(focus) = self.tokenizer.normalize_term(term) else {
            return Ok(Vec::new());
        };
        Ok(self.compute(docs, Some(&focus)).related(&focus, top_n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn doc(id: i64, text: &str) -> Document {
        let date = NaiveDate::from_ymd_opt(2020, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Document::new(id, date, text)
    }

    fn analyzer(config: CooccurrenceConfig) -> CooccurrenceAnalyzer {
        CooccurrenceAnalyzer::new(TokenizationPolicy::default(), config)
    }

    #[test]
    fn test_single_pair_counted_once() {
        let docs = vec![doc(1, "crimen violencia"), doc(2, "crimen")];
        let result = analyzer(CooccurrenceConfig::default()).analyze(&docs).unwrap();

        assert_eq!(result.pairs.len(), 1);
        let pair = &result.pairs[0];
        assert_eq!(pair.term_a, "crimen");
        assert_eq!(pair.term_b, "violencia");
        assert_eq!(pair.association_score, 1.0);
        assert_eq!(result.window_count, 2);
    }

    #[test]
    fn test_pmi_matches_definition() {
        let docs = vec![
            doc(1, "crimen violencia"),
            doc(2, "crimen"),
            doc(3, "lluvias"),
            doc(4, "violencia crimen"),
        ];
        let result = analyzer(CooccurrenceConfig {
            measure: AssociationMeasure::Pmi,
            ..Default::default()
        })
        .analyze(&docs)
        .unwrap();

        let pair = result.pair("violencia", "crimen").unwrap();
        let expected = (0.5_f64 / (0.75 * 0.5)).log2();
        assert!((pair.association_score - expected).abs() < 1e-12);
        assert_eq!(pair.cooccurrence_count, 2);
    }

    #[test]
    fn test_npmi_bounds() {
        assert_eq!(normalized_pmi(1.0, 1.0, 1.0), 1.0);
        assert_eq!(normalized_pmi(0.5, 0.5, 0.0), 0.0);
        let independent = normalized_pmi(0.5, 0.5, 0.25);
        assert!(independent.abs() < 1e-12);
        let perfect = normalized_pmi(0.5, 0.5, 0.5);
        assert!((perfect - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sentence_window() {
        let docs = vec![doc(1, "Crimen en Xalapa. Lluvias en Orizaba.")];
        let result = analyzer(CooccurrenceConfig {
            window: CooccurrenceWindow::Sentence,
            ..Default::default()
        })
        .analyze(&docs)
        .unwrap();

        assert!(result.pair("crimen", "xalapa").is_some());
        assert!(result.pair("crimen", "lluvias").is_none());
        assert_eq!(result.window_count, 2);
    }

    #[test]
    fn test_explicit_vocabulary_is_normalized() {
        let docs = vec![doc(1, "crimen violencia lluvias")];
        let result = analyzer(CooccurrenceConfig {
            vocabulary: Some(vec!["Crimen".into(), " LLUVIAS".into(), "de".into()]),
            ..Default::default()
        })
        .analyze(&docs)
        .unwrap();

        assert_eq!(result.vocabulary, vec!["crimen", "lluvias"]);
        assert_eq!(result.pairs.len(), 1);
    }

    #[test]
    fn test_top_k_and_min_count() {
        let docs = vec![
            doc(1, "puerto puerto carnaval playa"),
            doc(2, "puerto carnaval"),
        ];
        let result = analyzer(CooccurrenceConfig {
            top_k: 2,
            ..Default::default()
        })
        .analyze(&docs)
        .unwrap();
        assert_eq!(result.vocabulary, vec!["carnaval", "puerto"]);

        let result = analyzer(CooccurrenceConfig {
            min_count: 2,
            ..Default::default()
        })
        .analyze(&docs)
        .unwrap();
        assert_eq!(result.pairs.len(), 1);
        assert!(result.pair("carnaval", "puerto").is_some());
    }

    #[test]
    fn test_related_terms() {
        let docs = vec![
            doc(1, "crimen violencia policía"),
            doc(2, "crimen policía"),
            doc(3, "lluvias"),
        ];
        let related = analyzer(CooccurrenceConfig::default())
            .related(&docs, "Crimen", 5)
            .unwrap();

        let terms: Vec<&str> = related.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec!["policía", "violencia"]);
        assert_eq!(related[0].cooccurrence_count, 2);

        let none = analyzer(CooccurrenceConfig::default())
            .related(&docs, "de", 5)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_invalid_config() {
        let result = analyzer(CooccurrenceConfig {
            min_count: 0,
            ..Default::default()
        })
        .analyze(&[]);
        assert!(result.is_err());
        assert!(analyzer(CooccurrenceConfig::default())
            .related(&[], "crimen", 0)
            .is_err());
    }

    #[test]
    fn test_parse_options() {
        assert_eq!("npmi".parse::<AssociationMeasure>().unwrap(), AssociationMeasure::Npmi);
        assert_eq!(
            "Sentence".parse::<CooccurrenceWindow>().unwrap(),
            CooccurrenceWindow::Sentence
        );
        assert!("paragraph".parse::<CooccurrenceWindow>().is_err());
    }
}
