//! Threshold rule models

use serde::{Deserialize, Serialize};

use crate::config::ThresholdConfig;
use crate::error::{Error, Result};

use super::snapshot::MetricKind;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Greater than
    Gt,
    /// Less than
    Lt,
    /// Greater than or equal to
    Gte,
    /// Less than or equal to
    Lte,
}

impl Operator {
    /// Verb phrase used when rendering an alert message
    pub fn describe(self) -> &'static str {
        match self {
            Self::Gt => "exceeded",
            Self::Lt => "fell below",
            Self::Gte => "reached or exceeded",
            Self::Lte => "fell to or below",
        }
    }
}

/// Alert severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Info,
    /// Warning
    #[default]
    Warning,
    /// Critical
    Critical,
}

impl Severity {
    /// Upper-case label for message subjects
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

/// A threshold rule, fixed at process start.
///
/// The condition key correlates repeated firings of the same rule across
/// evaluation cycles and is what the cooldown ledger is keyed by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdRule {
    /// Condition key, unique within the rule set
    pub key: String,

    /// Which snapshot field this rule selects
    pub metric: MetricKind,

    /// Comparison operator
    pub operator: Operator,

    /// Threshold value, compared exactly (no tolerance)
    pub threshold: f64,

    /// Severity of the resulting alert
    pub severity: Severity,

    /// Human-readable name of the monitored signal
    pub label: String,
}

impl ThresholdRule {
    /// Check whether a value triggers this rule.
    ///
    /// Comparisons are exact: a boundary value does not trigger a strict
    /// operator.
    pub fn check(&self, value: f64) -> bool {
        match self.operator {
            Operator::Gt => value > self.threshold,
            Operator::Lt => value < self.threshold,
            Operator::Gte => value >= self.threshold,
            Operator::Lte => value <= self.threshold,
        }
    }

    /// The default governance rule set, in evaluation order
    pub fn defaults(thresholds: &ThresholdConfig) -> Vec<ThresholdRule> {
        vec![
            ThresholdRule {
                key: "model-accuracy".to_string(),
                metric: MetricKind::ModelAccuracy,
                operator: Operator::Lt,
                threshold: thresholds.min_accuracy,
                severity: Severity::Critical,
                label: "Model accuracy".to_string(),
            },
            ThresholdRule {
                key: "resource-usage".to_string(),
                metric: MetricKind::ResourceUsage,
                operator: Operator::Gt,
                threshold: thresholds.max_resource_usage,
                severity: Severity::Warning,
                label: "Resource usage".to_string(),
            },
            ThresholdRule {
                key: "api-latency".to_string(),
                metric: MetricKind::LatencyMs,
                operator: Operator::Gt,
                threshold: thresholds.max_latency_ms,
                severity: Severity::Warning,
                label: "Mean API latency".to_string(),
            },
            ThresholdRule {
                key: "llm-daily-cost".to_string(),
                metric: MetricKind::DailyLlmCost,
                operator: Operator::Gt,
                threshold: thresholds.daily_cost_limit,
                severity: Severity::Warning,
                label: "Daily LLM spend".to_string(),
            },
            ThresholdRule {
                key: "hallucination-rate".to_string(),
                metric: MetricKind::HallucinationRate,
                operator: Operator::Gt,
                threshold: thresholds.hallucination_ceiling,
                severity: Severity::Critical,
                label: "Hallucination rate".to_string(),
            },
        ]
    }

    /// Validate a rule set before monitoring begins.
    ///
    /// A malformed rule set is a startup-fatal configuration error.
    pub fn validate_set(rules: &[ThresholdRule]) -> Result<()> {
        if rules.is_empty() {
            return Err(Error::config("rule set is empty"));
        }

        let mut seen = std::collections::HashSet::new();
        for rule in rules {
            if rule.key.is_empty() {
                return Err(Error::config("rule with empty condition key"));
            }
            if !seen.insert(rule.key.as_str()) {
                return Err(Error::config(format!(
                    "duplicate condition key: {}",
                    rule.key
                )));
            }
            if !rule.threshold.is_finite() {
                return Err(Error::config(format!(
                    "rule {} has non-finite threshold",
                    rule.key
                )));
            }
        }

        Ok(())
    }
}
