//! Alert condition models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rule::{Severity, ThresholdRule};

/// The result of one rule firing against one snapshot.
///
/// Created fresh every evaluation cycle and consumed immediately by the
/// cooldown check and dispatch; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertCondition {
    /// Condition key, copied from the rule
    pub key: String,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// The metric value that triggered the rule
    pub value: f64,

    /// The threshold that was breached
    pub threshold: f64,

    /// When the rule was evaluated
    pub evaluated_at: DateTime<Utc>,
}

impl AlertCondition {
    /// Build a condition for a rule that fired on `value`
    pub fn from_rule(rule: &ThresholdRule, value: f64, evaluated_at: DateTime<Utc>) -> Self {
        Self {
            key: rule.key.clone(),
            severity: rule.severity,
            message: format!(
                "{} {} threshold of {:.2} (current value: {:.2})",
                rule.label,
                rule.operator.describe(),
                rule.threshold,
                value
            ),
            value,
            threshold: rule.threshold,
            evaluated_at,
        }
    }

    /// Synthetic condition used by the manual test-alert path
    pub fn test_alert(now: DateTime<Utc>) -> Self {
        Self {
            key: "test-alert".to_string(),
            severity: Severity::Info,
            message: "GovWatch test alert: notification channels are reachable".to_string(),
            value: 0.0,
            threshold: 0.0,
            evaluated_at: now,
        }
    }
}
