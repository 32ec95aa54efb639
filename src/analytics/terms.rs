//! Weighted term vectors per publication year
//!
//! Three weighting modes are supported:
//! - `raw_count`: occurrences, summed over a year's documents
//! - `tf`: occurrences / document length, averaged over a year's documents
//! - `tfidf`: `tf * idf`, averaged over a year's documents
//!
//! Inverse document frequency is computed once over every document passed in,
//! not per year, so weights stay comparable across years.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::text::{TokenizationPolicy, Tokenizer};
use super::{validate_year_range, AnalysisResult, InvalidParameterError};
use crate::models::Document;

/// Term weighting scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeightingMode {
    #[serde(rename = "raw_count", alias = "count")]
    RawCount,
    #[default]
    #[serde(rename = "tf")]
    Tf,
    #[serde(rename = "tfidf", alias = "tf_idf")]
    TfIdf,
}

impl WeightingMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RawCount => "raw_count",
            Self::Tf => "tf",
            Self::TfIdf => "tfidf",
        }
    }
}

impl fmt::Display for WeightingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightingMode {
    type Err = InvalidParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "raw_count" | "count" | "raw" => Ok(Self::RawCount),
            "tf" => Ok(Self::Tf),
            "tfidf" | "tf-idf" | "tf_idf" => Ok(Self::TfIdf),
            other => Err(InvalidParameterError::InvalidValue {
                name: "weighting",
                value: other.to_string(),
            }),
        }
    }
}

/// A term and its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermScore {
    pub term: String,
    pub score: f64,
}

/// Descending by score, then ascending by term
fn rank_desc(a_score: f64, a_term: &str, b_score: f64, b_term: &str) -> Ordering {
    b_score
        .partial_cmp(&a_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_term.cmp(b_term))
}

/// Term weights for one time bucket
///
/// Built once and never mutated. Absent terms have weight zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermVector {
    bucket: i32,
    weights: BTreeMap<String, f64>,
    document_count: usize,
}

impl TermVector {
    #[must_use]
    pub fn new(bucket: i32, weights: BTreeMap<String, f64>, document_count: usize) -> Self {
        Self {
            bucket,
            weights,
            document_count,
        }
    }

    /// Vector for a bucket without documents
    #[must_use]
    pub fn empty(bucket: i32) -> Self {
        Self::new(bucket, BTreeMap::new(), 0)
    }

    /// Element-wise mean of several vectors
    ///
    /// Every input counts once, including empty ones, so a year without
    /// documents pulls the mean towards zero.
    #[must_use]
    pub fn mean_of(bucket: i32, vectors: &[&TermVector]) -> Self {
        Self::mean_over(bucket, vectors, vectors.len())
    }

    /// Mean over a window of `span` buckets of which only `vectors` are
    /// materialized; the missing buckets count as zero vectors
    #[must_use]
    pub fn mean_over(bucket: i32, vectors: &[&TermVector], span: usize) -> Self {
        if vectors.is_empty() || span == 0 {
            return Self::empty(bucket);
        }

        let n = span.max(vectors.len()) as f64;
        let mut weights: BTreeMap<String, f64> = BTreeMap::new();
        for vector in vectors {
            for (term, weight) in &vector.weights {
                *weights.entry(term.clone()).or_insert(0.0) += weight;
            }
        }
        for weight in weights.values_mut() {
            *weight /= n;
        }

        let document_count = vectors.iter().map(|v| v.document_count).sum();
        Self::new(bucket, weights, document_count)
    }

    #[must_use]
    pub fn bucket(&self) -> i32 {
        self.bucket
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    /// Weight of a term, zero when absent
    #[must_use]
    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Terms and weights in lexical order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, w)| (t.as_str(), *w))
    }

    /// Highest-weighted terms, ties broken lexically
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<TermScore> {
        let mut ranked: Vec<(&str, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| rank_desc(a.1, a.0, b.1, b.0));
        ranked
            .into_iter()
            .take(n)
            .map(|(term, score)| TermScore {
                term: term.to_string(),
                score,
            })
            .collect()
    }
}

/// Term vectors for the requested years
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermExtraction {
    pub weighting: WeightingMode,
    pub vectors: BTreeMap<i32, TermVector>,
    /// Successfully tokenized documents used for idf
    pub corpus_size: usize,
    /// Documents that could not be tokenized
    pub skipped_documents: usize,
}

impl TermExtraction {
    /// Vector for a year; requested years are always present
    #[must_use]
    pub fn vector(&self, year: i32) -> Option<&TermVector> {
        self.vectors.get(&year)
    }
}

/// Mean TF-IDF ranking over a year range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopTerms {
    pub start_year: i32,
    pub end_year: i32,
    pub terms: Vec<TermScore>,
    pub document_count: usize,
    pub skipped_documents: usize,
}

struct TokenizedDoc {
    year: i32,
    counts: HashMap<String, u32>,
    length: u32,
}

struct Corpus {
    docs: Vec<TokenizedDoc>,
    skipped: usize,
}

/// Builds term vectors from documents
#[derive(Debug, Clone)]
pub struct TermExtractor {
    tokenizer: Tokenizer,
    weighting: WeightingMode,
    min_df: usize,
    max_df_ratio: f64,
    max_features: Option<usize>,
}

impl Default for TermExtractor {
    fn default() -> Self {
        Self::new(TokenizationPolicy::default())
    }
}

impl TermExtractor {
    #[must_use]
    pub fn new(policy: TokenizationPolicy) -> Self {
        Self {
            tokenizer: Tokenizer::new(policy),
            weighting: WeightingMode::default(),
            min_df: 1,
            max_df_ratio: 1.0,
            max_features: None,
        }
    }

    #[must_use]
    pub fn with_weighting(mut self, weighting: WeightingMode) -> Self {
        self.weighting = weighting;
        self
    }

    /// Vocabulary pruning by document frequency and size
    ///
    /// # Arguments
    /// * `min_df` - Minimum number of documents a term must appear in
    /// * `max_df_ratio` - Maximum share of documents a term may appear in
    /// * `max_features` - Keep only the most frequent terms
    #[must_use]
    pub fn with_vocabulary_limits(
        mut self,
        min_df: usize,
        max_df_ratio: f64,
        max_features: Option<usize>,
    ) -> Self {
        self.min_df = min_df;
        self.max_df_ratio = max_df_ratio;
        self.max_features = max_features;
        self
    }

    #[must_use]
    pub fn weighting(&self) -> WeightingMode {
        self.weighting
    }

    #[must_use]
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        self.tokenizer.policy().validate()?;
        if !(self.max_df_ratio > 0.0 && self.max_df_ratio <= 1.0) {
            return Err(InvalidParameterError::InvalidValue {
                name: "max_df_ratio",
                value: self.max_df_ratio.to_string(),
            });
        }
        if self.max_features == Some(0) {
            return Err(InvalidParameterError::InvalidValue {
                name: "max_features",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    fn tokenize_corpus(&self, docs: &[Document]) -> Corpus {
        let mut tokenized = Vec::with_capacity(docs.len());
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

            let mut counts: HashMap<String, u32> = HashMap::new();
            let mut length = 0u32;
            for term in self.tokenizer.tokenize(&text) {
                *counts.entry(term).or_insert(0) += 1;
                length += 1;
            }
            tokenized.push(TokenizedDoc {
                year: doc.year(),
                counts,
                length,
            });
        }

        Corpus {
            docs: tokenized,
            skipped,
        }
    }

    /// Idf of every term kept after vocabulary pruning
    fn vocabulary(&self, corpus: &Corpus) -> HashMap<String, f64> {
        let n = corpus.docs.len();
        let mut df: HashMap<&str, usize> = HashMap::new();
        let mut occurrences: HashMap<&str, u64> = HashMap::new();

        for doc in &corpus.docs {
            for (term, count) in &doc.counts {
                *df.entry(term.as_str()).or_insert(0) += 1;
                *occurrences.entry(term.as_str()).or_insert(0) += u64::from(*count);
            }
        }

        let max_df = self.max_df_ratio * n as f64;
        let mut kept: Vec<(&str, usize)> = df
            .into_iter()
            .filter(|(_, d)| *d >= self.min_df && (*d as f64) <= max_df)
            .collect();

        if let Some(limit) = self.max_features {
            kept.sort_by(|a, b| {
                occurrences[b.0]
                    .cmp(&occurrences[a.0])
                    .then_with(|| a.0.cmp(b.0))
            });
            kept.truncate(limit);
        }

        kept.into_iter()
            .map(|(term, d)| {
                let idf = ((1.0 + n as f64) / (1.0 + d as f64)).ln() + 1.0;
                (term.to_string(), idf)
            })
            .collect()
    }

    /// Aggregate per-document weights of a document group
    fn aggregate(
        &self,
        docs: &[&TokenizedDoc],
        idf: &HashMap<String, f64>,
        mode: WeightingMode,
    ) -> BTreeMap<String, f64> {
        let mut weights: BTreeMap<String, f64> = BTreeMap::new();
        if docs.is_empty() {
            return weights;
        }

        for doc in docs {
            if doc.length == 0 {
                continue;
            }
            for (term, count) in &doc.counts {
                let Some(term_idf) = idf.get(term) else {
                    continue;
                };
                let count = f64::from(*count);
                let tf = count / f64::from(doc.length);
                let weight = match mode {
                    WeightingMode::RawCount => count,
                    WeightingMode::Tf => tf,
                    WeightingMode::TfIdf => tf * term_idf,
                };
                *weights.entry(term.clone()).or_insert(0.0) += weight;
            }
        }

        if mode != WeightingMode::RawCount {
            let n = docs.len() as f64;
            for weight in weights.values_mut() {
                *weight /= n;
            }
        }
        weights
    }

    /// One term vector per requested year
    ///
    /// Documents outside the requested years still contribute to idf.
    /// Undecodable documents are logged and counted, never fatal.
    #[must_use]
    pub fn extract(&self, docs: &[Document], years: &[i32]) -> TermExtraction {
        let corpus = self.tokenize_corpus(docs);
        let idf = self.vocabulary(&corpus);

        let vectors = years
            .iter()
            .map(|&year| {
                let members: Vec<&TokenizedDoc> =
                    corpus.docs.iter().filter(|d| d.year == year).collect();
                let weights = self.aggregate(&members, &idf, self.weighting);
                (year, TermVector::new(year, weights, members.len()))
            })
            .collect();

        tracing::debug!(
            documents = corpus.docs.len(),
            skipped = corpus.skipped,
            vocabulary = idf.len(),
            weighting = %self.weighting,
            "Extracted term vectors"
        );

        TermExtraction {
            weighting: self.weighting,
            vectors,
            corpus_size: corpus.docs.len(),
            skipped_documents: corpus.skipped,
        }
    }

    /// Top terms of a year range by mean TF-IDF
    ///
    /// Only documents published within `start_year..=end_year` are used,
    /// for idf as well as for the ranking.
    pub fn top_terms(
        &self,
        docs: &[Document],
        start_year: i32,
        end_year: i32,
        top_n: usize,
    ) -> AnalysisResult<TopTerms> {
        validate_year_range(start_year, end_year)?;
        if top_n == 0 {
            return Err(InvalidParameterError::ZeroTopN);
        }

        let in_range: Vec<Document> = docs
            .iter()
            .filter(|d| (start_year..=end_year).contains(&d.year()))
            .cloned()
            .collect();
        let corpus = self.tokenize_corpus(&in_range);
        let idf = self.vocabulary(&corpus);

        let members: Vec<&TokenizedDoc> = corpus.docs.iter().collect();
        let weights = self.aggregate(&members, &idf, WeightingMode::TfIdf);
        let terms = TermVector::new(start_year, weights, members.len()).top(top_n);

        Ok(TopTerms {
            start_year,
            end_year,
            terms,
            document_count: members.len(),
            skipped_documents: corpus.skipped,
        })
    }
}
