//! Prometheus metrics for archive queries and analyses
//!
//! This module provides metrics tracking for:
//! - Query layer: queries per backend and status, query duration
//! - Analyses: runs per analysis and status, duration, documents analyzed
//!   and skipped
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for query layer metrics
struct QueryMetrics {
    queries: CounterVec,
    query_duration: HistogramVec,
}

/// Container for analysis metrics
struct AnalysisMetrics {
    runs: CounterVec,
    duration: HistogramVec,
    documents_analyzed: CounterVec,
    documents_skipped: CounterVec,
}

static QUERY_METRICS: OnceLock<QueryMetrics> = OnceLock::new();

static ANALYSIS_METRICS: OnceLock<AnalysisMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// This function should be called once at application startup.
/// If metric registration fails, subsequent metric operations become no-ops.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = alcalor::metrics::init_metrics() {
///     eprintln!("Warning: Metrics initialization failed: {}", e);
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let query = QueryMetrics {
        queries: register_counter_vec!(
            "alcalor_queries_total",
            "Total archive queries by backend and status",
            &["backend", "status"]
        )?,
        query_duration: register_histogram_vec!(
            "alcalor_query_duration_seconds",
            "Archive query duration in seconds",
            &["backend"],
            vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0]
        )?,
    };

    let analysis = AnalysisMetrics {
        runs: register_counter_vec!(
            "alcalor_analyses_total",
            "Total analysis runs by analysis and status",
            &["analysis", "status"]
        )?,
        duration: register_histogram_vec!(
            "alcalor_analysis_duration_seconds",
            "Analysis duration in seconds, queries included",
            &["analysis"],
            vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0]
        )?,
        documents_analyzed: register_counter_vec!(
            "alcalor_documents_analyzed_total",
            "Total documents analyzed",
            &["analysis"]
        )?,
        documents_skipped: register_counter_vec!(
            "alcalor_documents_skipped_total",
            "Total documents skipped because they could not be tokenized",
            &["analysis"]
        )?,
    };

    QUERY_METRICS
        .set(query)
        .map_err(|_| "Query metrics already initialized")?;
    ANALYSIS_METRICS
        .set(analysis)
        .map_err(|_| "Analysis metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    QUERY_METRICS.get().is_some() && ANALYSIS_METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record a finished archive query
pub fn record_query(backend: &str, success: bool, duration_secs: f64) {
    let Some(m) = QUERY_METRICS.get() else {
        return;
    };

    let status = if success { "ok" } else { "error" };
    m.queries.with_label_values(&[backend, status]).inc();
    m.query_duration
        .with_label_values(&[backend])
        .observe(duration_secs);
}

/// Record the outcome of an analysis run
pub fn record_analysis(analysis: &str, success: bool) {
    if let Some(m) = ANALYSIS_METRICS.get() {
        let status = if success { "ok" } else { "error" };
        m.runs.with_label_values(&[analysis, status]).inc();
    }
}

/// Record how many documents an analysis consumed and skipped
pub fn record_documents(analysis: &str, analyzed: usize, skipped: usize) {
    let Some(m) = ANALYSIS_METRICS.get() else {
        return;
    };

    if analyzed > 0 {
        m.documents_analyzed
            .with_label_values(&[analysis])
            .inc_by(analyzed as f64);
    }
    if skipped > 0 {
        m.documents_skipped
            .with_label_values(&[analysis])
            .inc_by(skipped as f64);
    }
}

/// Histogram timer guard that records duration on drop
pub struct MetricsTimer {
    timer: Option<prometheus::HistogramTimer>,
}

impl MetricsTimer {
    fn new(timer: prometheus::HistogramTimer) -> Self {
        Self { timer: Some(timer) }
    }

    /// Create a no-op timer when metrics are not initialized
    fn noop() -> Self {
        Self { timer: None }
    }
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_and_record();
        }
    }
}

/// Start an analysis timer
pub fn start_analysis_timer(analysis: &str) -> MetricsTimer {
    match ANALYSIS_METRICS.get() {
        Some(m) => MetricsTimer::new(m.duration.with_label_values(&[analysis]).start_timer()),
        None => MetricsTimer::noop(),
    }
}

// ============================================================================
// Tests
// ============================================================================
