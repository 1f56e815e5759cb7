//! Threshold rule evaluation

use chrono::Utc;
use tracing::warn;

use crate::models::{AlertCondition, MetricsSnapshot, ThresholdRule};

/// Evaluate every rule against one snapshot.
///
/// Deterministic and side-effect free apart from data-quality logging.
/// Conditions come back in rule-definition order and every matching rule is
/// reported; a rule whose metric is absent from the snapshot is skipped.
pub fn evaluate(snapshot: &MetricsSnapshot, rules: &[ThresholdRule]) -> Vec<AlertCondition> {
    let evaluated_at = Utc::now();
    let mut conditions = Vec::new();

    for rule in rules {
        let Some(value) = snapshot.metric(rule.metric) else {
            warn!(
                key = %rule.key,
                metric = rule.metric.name(),
                "Metric missing from snapshot, rule skipped"
            );
            continue;
        };

        if rule.check(value) {
            conditions.push(AlertCondition::from_rule(rule, value, evaluated_at));
        }
    }

    conditions
}
