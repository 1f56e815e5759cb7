//! Multi-channel notification dispatch

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::channels::{ChannelError, EmailTransport, SmsTransport};
use crate::models::{AlertCondition, Channel, ChannelResult, DispatchReport, NotificationRequest};

/// Fans one condition out across the configured channels.
///
/// Channels are issued concurrently and joined; each send is bounded by a
/// timeout so an unresponsive gateway cannot stall the scheduler. A channel
/// failure is captured in its `ChannelResult` and never propagates.
pub struct NotificationDispatcher {
    email: Option<Arc<dyn EmailTransport>>,
    sms: Option<Arc<dyn SmsTransport>>,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    /// Create a dispatcher over the available transports
    pub fn new(
        email: Option<Arc<dyn EmailTransport>>,
        sms: Option<Arc<dyn SmsTransport>>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            email,
            sms,
            send_timeout,
        }
    }

    /// Dispatch one request across its enabled channels.
    ///
    /// A request with no enabled channel (or no recipient for any enabled
    /// channel) is a no-op reported as `NoChannels`.
    pub async fn dispatch(&self, request: &NotificationRequest) -> DispatchReport {
        let email_to = request
            .email_recipient()
            .filter(|_| self.email.is_some())
            .map(str::to_string);
        let sms_to = request
            .sms_recipient()
            .filter(|_| self.sms.is_some())
            .map(str::to_string);

        if email_to.is_none() && sms_to.is_none() {
            debug!(key = %request.condition.key, "No notification channels configured");
            return DispatchReport::no_channels();
        }

        let (email_result, sms_result) = tokio::join!(
            self.send_email(email_to.as_deref(), &request.condition),
            self.send_sms(sms_to.as_deref(), &request.condition),
        );

        let results: Vec<ChannelResult> =
            email_result.into_iter().chain(sms_result).collect();

        let report = DispatchReport::from_results(results);
        for result in &report.results {
            if let Some(error) = &result.error {
                warn!(
                    key = %request.condition.key,
                    channel = result.channel.name(),
                    error = %error,
                    "Notification channel failed"
                );
            }
        }
        report
    }

    async fn send_email(&self, to: Option<&str>, condition: &AlertCondition) -> Option<ChannelResult> {
        let to = to?;
        let transport = self.email.as_ref()?;

        let subject = format!("[{}] GovWatch alert: {}", condition.severity.label(), condition.key);
        let body = format!(
            "{}\n\nTriggering value: {:.4}\nThreshold: {:.4}\nEvaluated at: {}",
            condition.message, condition.value, condition.threshold, condition.evaluated_at
        );

        let outcome = timeout(self.send_timeout, transport.send(to, &subject, &body)).await;
        Some(channel_result(Channel::Email, outcome))
    }

    async fn send_sms(&self, to: Option<&str>, condition: &AlertCondition) -> Option<ChannelResult> {
        let to = to?;
        let transport = self.sms.as_ref()?;

        let body = format!("GovWatch [{}] {}", condition.severity.label(), condition.message);

        let outcome = timeout(self.send_timeout, transport.send(to, &body)).await;
        Some(channel_result(Channel::Sms, outcome))
    }
}

fn channel_result(
    channel: Channel,
    outcome: Result<Result<(), ChannelError>, tokio::time::error::Elapsed>,
) -> ChannelResult {
    let error = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(_) => Some("send timed out".to_string()),
    };

    ChannelResult {
        channel,
        success: error.is_none(),
        error,
        sent_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DispatchOutcome;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockEmail {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmailTransport for MockEmail {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), ChannelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ChannelError::Http("connection refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct MockSms {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SmsTransport for MockSms {
        async fn send(&self, _to: &str, _body: &str) -> Result<(), ChannelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ChannelError::Http("gateway down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct StalledSms;

    #[async_trait]
    impl SmsTransport for StalledSms {
        async fn send(&self, _to: &str, _body: &str) -> Result<(), ChannelError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    fn request(email_enabled: bool, sms_enabled: bool) -> NotificationRequest {
        NotificationRequest {
            condition: AlertCondition::test_alert(Utc::now()),
            email_enabled,
            sms_enabled,
            email: Some("risk@example.com".to_string()),
            phone: Some("+15550100".to_string()),
        }
    }

    fn dispatcher(email: Arc<MockEmail>, sms: Arc<MockSms>) -> NotificationDispatcher {
        NotificationDispatcher::new(Some(email), Some(sms), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn email_failure_does_not_block_sms() {
        let email = Arc::new(MockEmail {
            fail: true,
            calls: AtomicUsize::new(0),
        });
        let sms = Arc::new(MockSms {
            fail: false,
            calls: AtomicUsize::new(0),
        });

        let report = dispatcher(email.clone(), sms.clone())
            .dispatch(&request(true, true))
            .await;

        assert_eq!(report.outcome, DispatchOutcome::Delivered);
        assert_eq!(report.results.len(), 2);

        let email_result = report
            .results
            .iter()
            .find(|r| r.channel == Channel::Email)
            .unwrap();
        assert!(!email_result.success);
        assert!(email_result.error.as_deref().unwrap().contains("connection refused"));

        let sms_result = report
            .results
            .iter()
            .find(|r| r.channel == Channel::Sms)
            .unwrap();
        assert!(sms_result.success);

        assert_eq!(email.calls.load(Ordering::SeqCst), 1);
        assert_eq!(sms.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_channels_failing_reports_failed() {
        let email = Arc::new(MockEmail {
            fail: true,
            calls: AtomicUsize::new(0),
        });
        let sms = Arc::new(MockSms {
            fail: true,
            calls: AtomicUsize::new(0),
        });

        let report = dispatcher(email, sms).dispatch(&request(true, true)).await;
        assert_eq!(report.outcome, DispatchOutcome::Failed);
        assert!(!report.delivered());
    }

    #[tokio::test]
    async fn no_enabled_channel_is_a_no_op() {
        let email = Arc::new(MockEmail {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let sms = Arc::new(MockSms {
            fail: false,
            calls: AtomicUsize::new(0),
        });

        let report = dispatcher(email.clone(), sms.clone())
            .dispatch(&request(false, false))
            .await;

        assert_eq!(report.outcome, DispatchOutcome::NoChannels);
        assert!(report.results.is_empty());
        assert_eq!(email.calls.load(Ordering::SeqCst), 0);
        assert_eq!(sms.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_recipient_disables_that_channel_only() {
        let email = Arc::new(MockEmail {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let sms = Arc::new(MockSms {
            fail: false,
            calls: AtomicUsize::new(0),
        });

        let mut req = request(true, true);
        req.email = None;

        let report = dispatcher(email.clone(), sms).dispatch(&req).await;
        assert_eq!(report.outcome, DispatchOutcome::Delivered);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].channel, Channel::Sms);
        assert_eq!(email.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_channel_is_bounded_by_the_send_timeout() {
        let email = Arc::new(MockEmail {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let dispatcher = NotificationDispatcher::new(
            Some(email),
            Some(Arc::new(StalledSms)),
            Duration::from_secs(5),
        );

        let report = dispatcher.dispatch(&request(true, true)).await;

        assert_eq!(report.outcome, DispatchOutcome::Delivered);
        let sms_result = report
            .results
            .iter()
            .find(|r| r.channel == Channel::Sms)
            .unwrap();
        assert!(!sms_result.success);
        assert_eq!(sms_result.error.as_deref(), Some("send timed out"));
    }
}
