//! Per-condition notification cooldown

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Tracks the last successful notification per condition key.
///
/// The periodic scheduler and the manual-trigger path share one ledger;
/// entries lock per key, so unrelated conditions never contend. Entries are
/// never deleted, they simply age out of relevance once the window elapses.
#[derive(Debug, Default)]
pub struct CooldownLedger {
    entries: DashMap<String, DateTime<Utc>>,
}

impl CooldownLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff a prior success exists for `key` and `now` is still inside
    /// its cooldown window
    pub fn should_suppress(&self, key: &str, now: DateTime<Utc>, window: Duration) -> bool {
        self.entries
            .get(key)
            .map(|last| now - *last < window)
            .unwrap_or(false)
    }

    /// Unconditionally overwrite the stored timestamp for `key`
    pub fn record_success(&self, key: &str, now: DateTime<Utc>) {
        self.entries.insert(key.to_string(), now);
    }

    /// Last successful notification for `key`, if any
    pub fn last_success(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|last| *last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Duration {
        Duration::minutes(5)
    }

    #[test]
    fn unknown_key_is_never_suppressed() {
        let ledger = CooldownLedger::new();
        assert!(!ledger.should_suppress("model-accuracy", Utc::now(), window()));
    }

    #[test]
    fn suppresses_inside_window_and_allows_after() {
        let ledger = CooldownLedger::new();
        let t0 = Utc::now();

        ledger.record_success("model-accuracy", t0);

        let t3 = t0 + Duration::minutes(3);
        assert!(ledger.should_suppress("model-accuracy", t3, window()));

        let t6 = t0 + Duration::minutes(6);
        assert!(!ledger.should_suppress("model-accuracy", t6, window()));
    }

    #[test]
    fn window_boundary_is_exclusive() {
        let ledger = CooldownLedger::new();
        let t0 = Utc::now();
        ledger.record_success("api-latency", t0);

        // exactly one window later the cooldown has elapsed
        assert!(!ledger.should_suppress("api-latency", t0 + window(), window()));
    }

    #[test]
    fn keys_are_independent() {
        let ledger = CooldownLedger::new();
        let t0 = Utc::now();
        ledger.record_success("model-accuracy", t0);

        assert!(ledger.should_suppress("model-accuracy", t0, window()));
        assert!(!ledger.should_suppress("resource-usage", t0, window()));
    }

    #[test]
    fn record_overwrites_and_extends_the_window() {
        let ledger = CooldownLedger::new();
        let t0 = Utc::now();
        ledger.record_success("llm-daily-cost", t0);

        let t6 = t0 + Duration::minutes(6);
        ledger.record_success("llm-daily-cost", t6);

        assert_eq!(ledger.last_success("llm-daily-cost"), Some(t6));
        assert!(ledger.should_suppress("llm-daily-cost", t6 + Duration::minutes(3), window()));
    }
}
