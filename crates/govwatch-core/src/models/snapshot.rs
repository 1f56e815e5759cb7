//! Metrics snapshot models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The health signal a threshold rule selects from a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Model accuracy, 0-1
    ModelAccuracy,
    /// CPU/memory utilization, 0-1 (max of the two at capture time)
    ResourceUsage,
    /// Mean API latency in milliseconds
    LatencyMs,
    /// LLM spend for the current day, in currency units
    DailyLlmCost,
    /// Hallucination rate, 0-1
    HallucinationRate,
}

impl MetricKind {
    /// Stable name used in log output and gateway payloads
    pub fn name(self) -> &'static str {
        match self {
            Self::ModelAccuracy => "model_accuracy",
            Self::ResourceUsage => "resource_usage",
            Self::LatencyMs => "latency_ms",
            Self::DailyLlmCost => "daily_llm_cost",
            Self::HallucinationRate => "hallucination_rate",
        }
    }
}

/// A point-in-time read of model and system health.
///
/// Immutable once captured; owned by the evaluation cycle that requested it.
/// Fields the analytics service could not compute are absent rather than
/// zeroed, so a rule over a missing metric is skipped instead of comparing
/// against a fabricated value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// When the snapshot was captured
    pub captured_at: DateTime<Utc>,

    /// Model accuracy, 0-1
    pub model_accuracy: Option<f64>,

    /// CPU/memory utilization, 0-1
    pub resource_usage: Option<f64>,

    /// Mean API latency in milliseconds
    pub avg_latency_ms: Option<f64>,

    /// LLM spend for the current day
    pub daily_llm_cost: Option<f64>,

    /// Hallucination rate, 0-1
    pub hallucination_rate: Option<f64>,
}

impl MetricsSnapshot {
    /// Look up the value a rule's metric selector points at
    pub fn metric(&self, kind: MetricKind) -> Option<f64> {
        match kind {
            MetricKind::ModelAccuracy => self.model_accuracy,
            MetricKind::ResourceUsage => self.resource_usage,
            MetricKind::LatencyMs => self.avg_latency_ms,
            MetricKind::DailyLlmCost => self.daily_llm_cost,
            MetricKind::HallucinationRate => self.hallucination_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_selector_maps_every_kind() {
        let snapshot = MetricsSnapshot {
            captured_at: Utc::now(),
            model_accuracy: Some(0.9),
            resource_usage: Some(0.5),
            avg_latency_ms: Some(120.0),
            daily_llm_cost: Some(12.5),
            hallucination_rate: None,
        };

        assert_eq!(snapshot.metric(MetricKind::ModelAccuracy), Some(0.9));
        assert_eq!(snapshot.metric(MetricKind::ResourceUsage), Some(0.5));
        assert_eq!(snapshot.metric(MetricKind::LatencyMs), Some(120.0));
        assert_eq!(snapshot.metric(MetricKind::DailyLlmCost), Some(12.5));
        assert_eq!(snapshot.metric(MetricKind::HallucinationRate), None);
    }
}
