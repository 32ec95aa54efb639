//! Emerging-term detection
//!
//! Compares the weight of each term in a target year against its mean weight
//! over the preceding `comparison_years`:
//!
//! ```text
//! growth(t) = (target(t) - baseline(t)) / (baseline(t) + epsilon)
//! ```
//!
//! Terms missing from the target year are never reported; terms missing from
//! the baseline have a baseline weight of zero and therefore rank highest.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::terms::{TermExtractor, TermVector, WeightingMode};
use super::{AnalysisResult, InvalidParameterError};
use crate::models::Document;

pub const DEFAULT_COMPARISON_YEARS: u32 = 3;
pub const DEFAULT_TOP_N: usize = 15;
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Parameters of one detection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergingTermsRequest {
    pub target_year: i32,
    pub comparison_years: u32,
    pub top_n: usize,
    pub weighting: WeightingMode,
    pub epsilon: f64,
    /// Target weights at or below this value are ignored
    pub min_target_weight: f64,
}

impl EmergingTermsRequest {
    #[must_use]
    pub fn new(target_year: i32) -> Self {
        Self {
            target_year,
            comparison_years: DEFAULT_COMPARISON_YEARS,
            top_n: DEFAULT_TOP_N,
            weighting: WeightingMode::Tf,
            epsilon: DEFAULT_EPSILON,
            min_target_weight: 0.0,
        }
    }

    #[must_use]
    pub fn with_comparison_years(mut self, years: u32) -> Self {
        self.comparison_years = years;
        self
    }

    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    #[must_use]
    pub fn with_weighting(mut self, weighting: WeightingMode) -> Self {
        self.weighting = weighting;
        self
    }

    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    #[must_use]
    pub fn with_min_target_weight(mut self, min_target_weight: f64) -> Self {
        self.min_target_weight = min_target_weight;
        self
    }

    /// Check the request and return the baseline window
    ///
    /// `archive_start` is the first year present in the archive, when known.
    /// A target year before it has neither documents nor a baseline. A target
    /// year equal to it is accepted and compared against an empty baseline.
    pub fn validate(&self, archive_start: Option<i32>) -> AnalysisResult<RangeInclusive<i32>> {
        if self.top_n == 0 {
            return Err(InvalidParameterError::ZeroTopN);
        }
        if self.comparison_years == 0 {
            return Err(InvalidParameterError::ZeroComparisonYears);
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(InvalidParameterError::InvalidValue {
                name: "epsilon",
                value: self.epsilon.to_string(),
            });
        }
        if !(self.min_target_weight.is_finite() && self.min_target_weight >= 0.0) {
            return Err(InvalidParameterError::InvalidValue {
                name: "min_target_weight",
                value: self.min_target_weight.to_string(),
            });
        }

        let out_of_range = || InvalidParameterError::WindowOutOfRange {
            target_year: self.target_year,
            comparison_years: self.comparison_years,
        };
        let span = i32::try_from(self.comparison_years).map_err(|_| out_of_range())?;
        let start = self.target_year.checked_sub(span).ok_or_else(out_of_range)?;
        let end = self.target_year.checked_sub(1).ok_or_else(out_of_range)?;

        if let Some(archive_start) = archive_start {
            if self.target_year < archive_start {
                return Err(InvalidParameterError::NoBaseline {
                    target_year: self.target_year,
                    comparison_years: self.comparison_years,
                    archive_start,
                });
            }
        }

        Ok(start..=end)
    }
}

/// A term whose weight grew against the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergingTerm {
    pub term: String,
    pub growth_score: f64,
    pub baseline_weight: f64,
    pub target_weight: f64,
}

/// Ranked emerging terms for one target year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergingTermResult {
    pub target_year: i32,
    pub baseline_start: i32,
    pub baseline_end: i32,
    pub weighting: WeightingMode,
    pub terms: Vec<EmergingTerm>,
    pub target_documents: usize,
    pub baseline_documents: usize,
    pub skipped_documents: usize,
}

impl EmergingTermResult {
    fn empty(request: &EmergingTermsRequest, window: &RangeInclusive<i32>) -> Self {
        Self {
            target_year: request.target_year,
            baseline_start: *window.start(),
            baseline_end: *window.end(),
            weighting: request.weighting,
            terms: Vec::new(),
            target_documents: 0,
            baseline_documents: 0,
            skipped_documents: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Growth desc, then target weight desc, then term asc
fn emerging_order(a: &EmergingTerm, b: &EmergingTerm) -> Ordering {
    b.growth_score
        .partial_cmp(&a.growth_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            b.target_weight
                .partial_cmp(&a.target_weight)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.term.cmp(&b.term))
}

/// Detects terms that gained weight in a target year
#[derive(Debug, Clone, Default)]
pub struct EmergingTermDetector {
    extractor: TermExtractor,
}

impl EmergingTermDetector {
    /// Detector using the extractor's tokenization and vocabulary settings;
    /// the weighting comes from each request
    #[must_use]
    pub fn new(extractor: TermExtractor) -> Self {
        Self { extractor }
    }

    /// Rank emerging terms of `request.target_year`
    ///
    /// `docs` should cover the target year and its baseline window; documents
    /// from other years only influence idf.
    pub fn detect(
        &self,
        request: &EmergingTermsRequest,
        docs: &[Document],
        archive_start: Option<i32>,
    ) -> AnalysisResult<EmergingTermResult> {
        let window = request.validate(archive_start)?;
        let extractor = self.extractor.clone().with_weighting(request.weighting);
        extractor.validate()?;

        // Only years holding documents get a vector; the rest of the window
        // enters the baseline mean as zeros.
        let mut years: BTreeSet<i32> = docs
            .iter()
            .map(Document::year)
            .filter(|year| window.contains(year))
            .collect();
        years.insert(request.target_year);
        let years: Vec<i32> = years.into_iter().collect();
        let extraction = extractor.extract(docs, &years);

        let mut result = EmergingTermResult::empty(request, &window);
        result.skipped_documents = extraction.skipped_documents;

        let Some(target) = extraction
            .vector(request.target_year)
            .filter(|v| v.document_count() > 0)
        else {
            tracing::info!(
                target_year = request.target_year,
                "No documents in target year"
            );
            return Ok(result);
        };

        let baseline_vectors: Vec<&TermVector> = years
            .iter()
            .filter(|year| window.contains(*year))
            .filter_map(|&year| extraction.vector(year))
            .collect();
        let span = usize::try_from(request.comparison_years).unwrap_or(usize::MAX);
        let baseline = TermVector::mean_over(*window.start(), &baseline_vectors, span);

        let mut terms: Vec<EmergingTerm> = target
            .iter()
            .filter(|(_, weight)| *weight > 0.0 && *weight > request.min_target_weight)
            .map(|(term, target_weight)| {
                let baseline_weight = baseline.weight(term);
                EmergingTerm {
                    term: term.to_string(),
                    growth_score: (target_weight - baseline_weight)
                        / (baseline_weight + request.epsilon),
                    baseline_weight,
                    target_weight,
                }
            })
            .collect();

        terms.sort_by(emerging_order);
        terms.truncate(request.top_n);

        result.target_documents = target.document_count();
        result.baseline_documents = baseline.document_count();
        result.terms = terms;

        tracing::debug!(
            target_year = request.target_year,
            baseline_documents = result.baseline_documents,
            terms = result.terms.len(),
            "Emerging terms detected"
        );
        Ok(result)
    }
}
