//! Prometheus metrics for admission decisions
//!
//! Hosts that expose a `/metrics` endpoint render [`AdmissionMetrics::encode`].

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// Labels for decision metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct DecisionLabels {
    pub outcome: String,
}

/// Shared metrics state
pub struct AdmissionMetrics {
    /// Decisions by outcome
    pub decisions_total: Family<DecisionLabels, Counter>,
    /// Time from receiving a request to producing its decision
    pub decision_duration_seconds: Histogram,
    /// Remote access reviews that failed or timed out
    pub remote_review_failures_total: Counter,

    registry: Registry,
}

impl Default for AdmissionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let decisions_total = Family::<DecisionLabels, Counter>::default();
        registry.register(
            "certificate_admission_decisions",
            "Total number of admission decisions",
            decisions_total.clone(),
        );

        let decision_duration_seconds = Histogram::new(exponential_buckets(0.0005, 2.0, 14));
        registry.register(
            "certificate_admission_decision_duration_seconds",
            "Duration of an admission decision in seconds",
            decision_duration_seconds.clone(),
        );

        let remote_review_failures_total = Counter::default();
        registry.register(
            "certificate_admission_remote_review_failures",
            "Total number of failed remote access reviews",
            remote_review_failures_total.clone(),
        );

        Self {
            decisions_total,
            decision_duration_seconds,
            remote_review_failures_total,
            registry,
        }
    }

    pub fn record_decision(&self, outcome: &str, duration_secs: f64) {
        self.decisions_total
            .get_or_create(&DecisionLabels {
                outcome: outcome.to_string(),
            })
            .inc();
        self.decision_duration_seconds.observe(duration_secs);
    }

    pub fn record_review_failure(&self) {
        self.remote_review_failures_total.inc();
    }

    /// Render all metrics in Prometheus text format
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}
