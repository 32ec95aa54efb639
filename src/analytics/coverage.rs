//! Monthly topic coverage and anomaly detection
//!
//! A topic's share of a month is the percentage of that month's articles
//! mentioning any of its keywords. Months whose share lies more than `sigma`
//! sample standard deviations from the topic mean are reported as spikes or
//! drops.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use super::{AnalysisResult, InvalidParameterError};

pub const DEFAULT_SIGMA: f64 = 2.0;

/// A named set of keywords matched case-insensitively as substrings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub keywords: Vec<String>,
}

impl Topic {
    #[must_use]
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    /// Topics tracked by default
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("violencia", &["violencia", "homicidio"]),
            Self::new("corrupcion", &["corrupción", "fraude"]),
            Self::new("economia", &["economía", "empleo", "inversión"]),
            Self::new("salud", &["salud", "hospital", "médico"]),
            Self::new("educacion", &["educación", "escuela", "universidad"]),
        ]
    }
}

/// Article counts of one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoveragePoint {
    /// `YYYY-MM`
    pub month: String,
    pub total: u64,
    /// Articles mentioning each topic
    pub counts: BTreeMap<String, u64>,
}

impl CoveragePoint {
    /// Percentage of the month's articles covering `topic`
    #[must_use]
    pub fn share(&self, topic: &str) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let count = self.counts.get(topic).copied().unwrap_or(0);
        count as f64 / self.total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyDirection {
    Spike,
    Drop,
}

impl fmt::Display for AnomalyDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spike => f.write_str("spike"),
            Self::Drop => f.write_str("drop"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageAnomaly {
    pub topic: String,
    pub month: String,
    pub share: f64,
    pub mean: f64,
    pub z_score: f64,
    pub direction: AnomalyDirection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    pub topics: Vec<String>,
    pub points: Vec<CoveragePoint>,
    /// Ordered by month, then topic order
    pub anomalies: Vec<CoverageAnomaly>,
}

#[derive(Debug, Clone)]
pub struct CoverageAnalyzer {
    topics: Vec<Topic>,
    sigma: f64,
}

impl Default for CoverageAnalyzer {
    fn default() -> Self {
        Self::new(Topic::defaults(), DEFAULT_SIGMA)
    }
}

impl CoverageAnalyzer {
    #[must_use]
    pub fn new(topics: Vec<Topic>, sigma: f64) -> Self {
        Self { topics, sigma }
    }

    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(InvalidParameterError::InvalidValue {
                name: "sigma",
                value: self.sigma.to_string(),
            });
        }
        Ok(())
    }

    fn topic_anomalies(&self, topic: &str, points: &[CoveragePoint]) -> Vec<CoverageAnomaly> {
        let shares: Vec<f64> = points.iter().map(|p| p.share(topic)).collect();
        if shares.len() < 2 {
            return Vec::new();
        }

        let mean = shares.iter().mean();
        let std_dev = shares.iter().std_dev();
        if !(std_dev.is_finite() && std_dev > 0.0) {
            return Vec::new();
        }

        points
            .iter()
            .zip(&shares)
            .filter_map(|(point, &share)| {
                let z_score = (share - mean) / std_dev;
                if z_score.abs() <= self.sigma {
                    return None;
                }
                Some(CoverageAnomaly {
                    topic: topic.to_string(),
                    month: point.month.clone(),
                    share,
                    mean,
                    z_score,
                    direction: if z_score > 0.0 {
                        AnomalyDirection::Spike
                    } else {
                        AnomalyDirection::Drop
                    },
                })
            })
            .collect()
    }

    /// Flag anomalous months for every topic
    ///
    /// Months with no articles are ignored.
    pub fn detect(&self, points: Vec<CoveragePoint>) -> AnalysisResult<CoverageReport> {
        self.validate()?;

        let points: Vec<CoveragePoint> = points.into_iter().filter(|p| p.total > 0).collect();
        let mut anomalies: Vec<CoverageAnomaly> = self
            .topics
            .iter()
            .flat_map(|topic| self.topic_anomalies(&topic.name, &points))
            .collect();

        let rank: BTreeMap<&str, usize> = self
            .topics
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.as_str(), i))
            .collect();
        anomalies.sort_by(|a, b| {
            a.month
                .cmp(&b.month)
                .then_with(|| rank.get(a.topic.as_str()).cmp(&rank.get(b.topic.as_str())))
        });

        tracing::debug!(
            months = points.len(),
            anomalies = anomalies.len(),
            sigma = self.sigma,
            "Coverage anomalies detected"
        );

        Ok(CoverageReport {
            topics: self.topics.iter().map(|t| t.name.clone()).collect(),
            points,
            anomalies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(month: &str, total: u64, violencia: u64) -> CoveragePoint {
        let mut counts = BTreeMap::new();
        counts.insert("violencia".to_string(), violencia);
        CoveragePoint {
            month: month.to_string(),
            total,
            counts,
        }
    }

    fn analyzer(sigma: f64) -> CoverageAnalyzer {
        CoverageAnalyzer::new(vec![Topic::new("violencia", &["violencia"])], sigma)
    }

    #[test]
    fn test_share() {
        assert_eq!(point("2020-01", 200, 50).share("violencia"), 25.0);
        assert_eq!(point("2020-01", 200, 50).share("salud"), 0.0);
        assert_eq!(point("2020-01", 0, 0).share("violencia"), 0.0);
    }

    #[test]
    fn test_spike_detected() {
        let mut points: Vec<CoveragePoint> = (1..=11)
            .map(|m| point(&format!("2020-{m:02}"), 100, 10))
            .collect();
        points.push(point("2020-12", 100, 60));

        let report = analyzer(2.0).detect(points).unwrap();
        assert_eq!(report.anomalies.len(), 1);
        let anomaly = &report.anomalies[0];
        assert_eq!(anomaly.month, "2020-12");
        assert_eq!(anomaly.direction, AnomalyDirection::Spike);
        assert!(anomaly.z_score > 2.0);
    }

    #[test]
    fn test_drop_detected() {
        let mut points: Vec<CoveragePoint> = (1..=11)
            .map(|m| point(&format!("2021-{m:02}"), 100, 40))
            .collect();
        points.push(point("2021-12", 100, 0));

        let report = analyzer(2.0).detect(points).unwrap();
        assert_eq!(report.anomalies[0].direction, AnomalyDirection::Drop);
    }

    #[test]
    fn test_flat_or_short_series_has_no_anomalies() {
        let flat: Vec<CoveragePoint> = (1..=6)
            .map(|m| point(&format!("2020-{m:02}"), 100, 10))
            .collect();
        assert!(analyzer(1.0).detect(flat).unwrap().anomalies.is_empty());

        let single = vec![point("2020-01", 100, 90)];
        assert!(analyzer(1.0).detect(single).unwrap().anomalies.is_empty());
    }

    #[test]
    fn test_invalid_sigma() {
        assert!(analyzer(0.0).detect(Vec::new()).is_err());
        assert!(analyzer(f64::NAN).detect(Vec::new()).is_err());
    }

    #[test]
    fn test_default_topics() {
        let names: Vec<String> = Topic::defaults().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec!["violencia", "corrupcion", "economia", "salud", "educacion"]
        );
    }
}
