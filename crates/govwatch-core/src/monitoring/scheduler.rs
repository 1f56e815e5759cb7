//! Monitoring scheduler
//!
//! Owns the periodic evaluation timer and the manual test-alert path.
//! One cycle: pull a snapshot, evaluate the rule set, check each surviving
//! condition against the cooldown ledger, dispatch, and record successes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{
    AlertCondition, ChannelResult, DispatchOutcome, MetricsSnapshot, NotificationRequest,
    ThresholdRule,
};
use crate::providers::MetricsProvider;

use super::cooldown::CooldownLedger;
use super::dispatcher::NotificationDispatcher;
use super::evaluator::evaluate;
use super::history::{AlertHistory, AlertRecord};

/// Engine settings fixed at construction
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Cooldown window per condition key
    pub cooldown: chrono::Duration,
    /// Timeout for one metrics snapshot pull
    pub provider_timeout: Duration,
    /// Alert history capacity
    pub history_capacity: usize,
    /// Whether the email channel is enabled
    pub email_enabled: bool,
    /// Whether the SMS channel is enabled
    pub sms_enabled: bool,
    /// Configured email recipient
    pub alert_email: Option<String>,
    /// Configured SMS recipient
    pub alert_phone: Option<String>,
}

impl MonitorSettings {
    /// Derive settings from the loaded config
    pub fn from_config(config: &Config) -> Self {
        Self {
            cooldown: chrono::Duration::minutes(config.monitor.cooldown_minutes as i64),
            provider_timeout: Duration::from_secs(config.monitor.provider_timeout_secs),
            history_capacity: config.monitor.history_capacity,
            email_enabled: config.notifications.email_enabled,
            sms_enabled: config.notifications.sms_enabled,
            alert_email: config.notifications.alert_email.clone(),
            alert_phone: config.notifications.alert_phone.clone(),
        }
    }
}

/// Outcome of a manual test alert, reported to the caller per channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestAlertReport {
    /// Whether at least one channel delivered
    pub success: bool,
    /// Per-channel results
    pub results: Vec<ChannelResult>,
    /// Set when no channel was usable
    pub error: Option<String>,
}

struct RunHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

struct Inner {
    settings: MonitorSettings,
    rules: Vec<ThresholdRule>,
    provider: Arc<dyn MetricsProvider>,
    dispatcher: NotificationDispatcher,
    ledger: CooldownLedger,
    history: AlertHistory,
    run: Mutex<Option<RunHandle>>,
}

/// The monitoring scheduler.
///
/// `Stopped -> Running -> Stopped`: `start_monitoring` arms the recurring
/// timer (idempotent while running), `stop` cancels it. The periodic task
/// and manual test alerts share the dispatcher but only the periodic path
/// consults or updates the cooldown ledger.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<Inner>,
}

impl Monitor {
    /// Build a monitor over a rule set, metrics provider, and dispatcher.
    ///
    /// The rule set is validated here; a malformed set is fatal before
    /// monitoring begins.
    pub fn new(
        settings: MonitorSettings,
        rules: Vec<ThresholdRule>,
        provider: Arc<dyn MetricsProvider>,
        dispatcher: NotificationDispatcher,
    ) -> Result<Self> {
        ThresholdRule::validate_set(&rules)?;
        if settings.cooldown < chrono::Duration::zero() {
            return Err(Error::config("cooldown window is negative"));
        }

        let history = AlertHistory::new(settings.history_capacity);
        Ok(Self {
            inner: Arc::new(Inner {
                settings,
                rules,
                provider,
                dispatcher,
                ledger: CooldownLedger::new(),
                history,
                run: Mutex::new(None),
            }),
        })
    }

    /// Begin periodic evaluation every `interval_minutes`.
    ///
    /// Rejects a zero interval before any state change. Calling while
    /// already running is a no-op; exactly one timer stays armed.
    pub fn start_monitoring(&self, interval_minutes: u32) -> Result<()> {
        if interval_minutes == 0 {
            return Err(Error::validation("poll interval must be positive"));
        }

        let mut run = self.inner.run.lock();
        if run.is_some() {
            debug!("Monitor already running, start ignored");
            return Ok(());
        }

        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let inner = Arc::clone(&self.inner);
        let period = Duration::from_secs(u64::from(interval_minutes) * 60);

        let task = tokio::spawn(async move {
            // First firing one full interval after start, not immediately
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = loop_cancel.cancelled() => {
                        info!("Monitoring loop stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        inner.run_cycle().await;
                    }
                }
            }
        });

        *run = Some(RunHandle { cancel, task });
        info!(interval_minutes, "Monitoring started");
        Ok(())
    }

    /// Halt periodic evaluation.
    ///
    /// The armed timer is cancelled so no further cycle begins; a cycle
    /// already in progress finishes, leaving no dispatch half-completed.
    pub fn stop(&self) {
        let handle = self.inner.run.lock().take();
        if let Some(handle) = handle {
            handle.cancel.cancel();
            drop(handle.task);
            info!("Monitoring stop requested");
        }
    }

    /// Whether the periodic timer is armed
    pub fn is_running(&self) -> bool {
        self.inner.run.lock().is_some()
    }

    /// Send an immediate test alert, bypassing the evaluator and the
    /// cooldown ledger.
    ///
    /// Overrides replace the configured recipient for their channel and
    /// force that channel on, so an operator can probe a disabled channel.
    pub async fn send_test_alert(
        &self,
        email_override: Option<String>,
        phone_override: Option<String>,
    ) -> TestAlertReport {
        let settings = &self.inner.settings;
        let request = NotificationRequest {
            condition: AlertCondition::test_alert(Utc::now()),
            email_enabled: settings.email_enabled || email_override.is_some(),
            sms_enabled: settings.sms_enabled || phone_override.is_some(),
            email: email_override.or_else(|| settings.alert_email.clone()),
            phone: phone_override.or_else(|| settings.alert_phone.clone()),
        };

        let report = self.inner.dispatcher.dispatch(&request).await;
        let error = match report.outcome {
            DispatchOutcome::NoChannels => Some("no notification channels configured".to_string()),
            _ => None,
        };

        TestAlertReport {
            success: report.delivered(),
            results: report.results,
            error,
        }
    }

    /// Pull one snapshot and evaluate the rule set without dispatching.
    ///
    /// Used by the CLI dry-run; the ledger is not consulted or updated.
    pub async fn evaluate_once(&self) -> Result<(MetricsSnapshot, Vec<AlertCondition>)> {
        let snapshot = self.inner.pull_snapshot().await?;
        let conditions = evaluate(&snapshot, &self.inner.rules);
        Ok((snapshot, conditions))
    }

    /// Most recently dispatched alerts, newest first
    pub fn recent_alerts(&self, limit: usize) -> Vec<AlertRecord> {
        self.inner.history.recent(limit)
    }
}

impl Inner {
    async fn pull_snapshot(&self) -> Result<MetricsSnapshot> {
        match timeout(self.settings.provider_timeout, self.provider.snapshot()).await {
            Ok(result) => result,
            Err(_) => Err(Error::provider("snapshot pull timed out")),
        }
    }

    /// One evaluation cycle. Never returns an error: a transient provider
    /// failure skips this cycle only and the timer keeps running.
    async fn run_cycle(&self) {
        let snapshot = match self.pull_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Skipping cycle: metrics pull failed");
                return;
            }
        };

        let conditions = evaluate(&snapshot, &self.rules);
        debug!(conditions = conditions.len(), "Evaluation cycle complete");

        // Conditions dispatch in rule-definition order, each independently
        // subject to cooldown.
        for condition in conditions {
            if self
                .ledger
                .should_suppress(&condition.key, Utc::now(), self.settings.cooldown)
            {
                debug!(key = %condition.key, "Condition suppressed by cooldown");
                continue;
            }

            let request = NotificationRequest {
                condition: condition.clone(),
                email_enabled: self.settings.email_enabled,
                sms_enabled: self.settings.sms_enabled,
                email: self.settings.alert_email.clone(),
                phone: self.settings.alert_phone.clone(),
            };

            let report = self.dispatcher.dispatch(&request).await;

            if report.delivered() {
                self.ledger.record_success(&condition.key, Utc::now());
                info!(
                    key = %condition.key,
                    severity = ?condition.severity,
                    "Alert notification delivered"
                );
            } else {
                warn!(
                    key = %condition.key,
                    outcome = ?report.outcome,
                    "Alert notification not delivered"
                );
            }

            self.history.record(condition, report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{ChannelError, EmailTransport};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct MockProvider {
        pulls: AtomicUsize,
        fail: AtomicBool,
        accuracy: f64,
    }

    impl MockProvider {
        fn new(accuracy: f64) -> Arc<Self> {
            Arc::new(Self {
                pulls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                accuracy,
            })
        }
    }

    #[async_trait]
    impl MetricsProvider for MockProvider {
        async fn snapshot(&self) -> Result<MetricsSnapshot> {
            self.pulls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::provider("analytics service unavailable"));
            }
            Ok(MetricsSnapshot {
                captured_at: Utc::now(),
                model_accuracy: Some(self.accuracy),
                resource_usage: Some(0.10),
                avg_latency_ms: Some(150.0),
                daily_llm_cost: Some(1.0),
                hallucination_rate: Some(0.0),
            })
        }
    }

    struct MockEmail {
        sends: AtomicUsize,
        fail: AtomicBool,
    }

    impl MockEmail {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                sends: AtomicUsize::new(0),
                fail: AtomicBool::new(fail),
            })
        }
    }

    #[async_trait]
    impl EmailTransport for MockEmail {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> std::result::Result<(), ChannelError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(ChannelError::Http("gateway down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn settings() -> MonitorSettings {
        MonitorSettings {
            cooldown: chrono::Duration::minutes(5),
            provider_timeout: Duration::from_secs(5),
            history_capacity: 32,
            email_enabled: true,
            sms_enabled: false,
            alert_email: Some("risk@example.com".to_string()),
            alert_phone: None,
        }
    }

    fn monitor(provider: Arc<MockProvider>, email: Arc<MockEmail>) -> Monitor {
        let dispatcher =
            NotificationDispatcher::new(Some(email), None, Duration::from_secs(5));
        Monitor::new(
            settings(),
            ThresholdRule::defaults(&crate::config::ThresholdConfig::default()),
            provider,
            dispatcher,
        )
        .unwrap()
    }

    async fn run_for(minutes: u64) {
        tokio::time::sleep(Duration::from_secs(minutes * 60)).await;
    }

    #[tokio::test]
    async fn zero_interval_is_rejected_before_any_state_change() {
        let m = monitor(MockProvider::new(0.9), MockEmail::new(false));
        let err = m.start_monitoring(0).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(!m.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_arms_exactly_one_timer() {
        let provider = MockProvider::new(0.9);
        let m = monitor(provider.clone(), MockEmail::new(false));

        m.start_monitoring(5).unwrap();
        m.start_monitoring(5).unwrap();
        assert!(m.is_running());

        // one cycle per 5-minute interval, not two
        run_for(6).await;
        assert_eq!(provider.pulls.load(Ordering::SeqCst), 1);

        run_for(5).await;
        assert_eq!(provider.pulls.load(Ordering::SeqCst), 2);

        m.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_cycles() {
        let provider = MockProvider::new(0.9);
        let m = monitor(provider.clone(), MockEmail::new(false));

        m.start_monitoring(5).unwrap();
        run_for(6).await;
        assert_eq!(provider.pulls.load(Ordering::SeqCst), 1);

        m.stop();
        assert!(!m.is_running());

        run_for(20).await;
        assert_eq!(provider.pulls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn provider_failure_skips_the_cycle_and_the_loop_continues() {
        let provider = MockProvider::new(0.5);
        let email = MockEmail::new(false);
        let m = monitor(provider.clone(), email.clone());

        provider.fail.store(true, Ordering::SeqCst);
        m.start_monitoring(5).unwrap();

        run_for(6).await;
        assert_eq!(provider.pulls.load(Ordering::SeqCst), 1);
        assert_eq!(email.sends.load(Ordering::SeqCst), 0);

        provider.fail.store(false, Ordering::SeqCst);
        run_for(5).await;
        assert_eq!(provider.pulls.load(Ordering::SeqCst), 2);
        assert_eq!(email.sends.load(Ordering::SeqCst), 1);

        m.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_condition_notifies_once_per_cooldown_window() {
        // accuracy 0.5 breaches on every poll, but wall-clock time stays
        // inside the 5-minute cooldown for the whole test
        let provider = MockProvider::new(0.5);
        let email = MockEmail::new(false);
        let m = monitor(provider.clone(), email.clone());

        m.start_monitoring(5).unwrap();
        run_for(16).await;

        assert_eq!(provider.pulls.load(Ordering::SeqCst), 3);
        assert_eq!(email.sends.load(Ordering::SeqCst), 1);

        m.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_dispatch_leaves_the_ledger_untouched_for_retry() {
        let provider = MockProvider::new(0.5);
        let email = MockEmail::new(true);
        let m = monitor(provider.clone(), email.clone());

        m.start_monitoring(5).unwrap();
        run_for(16).await;

        // no successful notification was ever recorded, so every cycle retried
        assert_eq!(email.sends.load(Ordering::SeqCst), 3);
        assert!(m.inner.ledger.last_success("model-accuracy").is_none());

        let records = m.recent_alerts(10);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| !r.report.delivered()));

        m.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_bypasses_cooldown_and_never_writes_the_ledger() {
        let provider = MockProvider::new(0.5);
        let email = MockEmail::new(false);
        let m = monitor(provider.clone(), email.clone());

        // drive one real alert so model-accuracy is inside its cooldown
        m.start_monitoring(5).unwrap();
        run_for(6).await;
        assert_eq!(email.sends.load(Ordering::SeqCst), 1);

        let report = m.send_test_alert(None, None).await;
        assert!(report.success);
        assert_eq!(email.sends.load(Ordering::SeqCst), 2);
        assert!(m.inner.ledger.last_success("test-alert").is_none());

        m.stop();
    }

    #[tokio::test]
    async fn test_alert_with_no_channels_reports_a_no_op() {
        let dispatcher = NotificationDispatcher::new(None, None, Duration::from_secs(5));
        let m = Monitor::new(
            MonitorSettings {
                email_enabled: false,
                sms_enabled: false,
                alert_email: None,
                alert_phone: None,
                ..settings()
            },
            ThresholdRule::defaults(&crate::config::ThresholdConfig::default()),
            MockProvider::new(0.9),
            dispatcher,
        )
        .unwrap();

        let report = m.send_test_alert(None, None).await;
        assert!(!report.success);
        assert!(report.results.is_empty());
        assert_eq!(
            report.error.as_deref(),
            Some("no notification channels configured")
        );
    }

    #[tokio::test]
    async fn test_alert_override_forces_a_disabled_channel_on() {
        let email = MockEmail::new(false);
        let dispatcher =
            NotificationDispatcher::new(Some(email.clone()), None, Duration::from_secs(5));
        let m = Monitor::new(
            MonitorSettings {
                email_enabled: false,
                alert_email: None,
                ..settings()
            },
            ThresholdRule::defaults(&crate::config::ThresholdConfig::default()),
            MockProvider::new(0.9),
            dispatcher,
        )
        .unwrap();

        let report = m
            .send_test_alert(Some("oncall@example.com".to_string()), None)
            .await;
        assert!(report.success);
        assert_eq!(email.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn evaluate_once_does_not_dispatch() {
        let provider = MockProvider::new(0.5);
        let email = MockEmail::new(false);
        let m = monitor(provider.clone(), email.clone());

        let (snapshot, conditions) = m.evaluate_once().await.unwrap();
        assert_eq!(snapshot.model_accuracy, Some(0.5));
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].key, "model-accuracy");
        assert_eq!(email.sends.load(Ordering::SeqCst), 0);
    }
}
