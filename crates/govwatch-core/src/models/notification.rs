//! Notification request and dispatch result models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::condition::AlertCondition;

/// A notification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Email transport
    Email,
    /// SMS transport
    Sms,
}

impl Channel {
    /// Channel name for logs and results
    pub fn name(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }
}

/// One dispatch request: the condition to report plus the recipient set
/// and channel enable flags in effect for this send.
///
/// Built per dispatch call; not persisted.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    /// The condition being reported
    pub condition: AlertCondition,
    /// Whether the email channel is enabled
    pub email_enabled: bool,
    /// Whether the SMS channel is enabled
    pub sms_enabled: bool,
    /// Email recipient
    pub email: Option<String>,
    /// SMS recipient
    pub phone: Option<String>,
}

impl NotificationRequest {
    fn wants(&self, channel: Channel) -> Option<&str> {
        let (enabled, recipient) = match channel {
            Channel::Email => (self.email_enabled, self.email.as_deref()),
            Channel::Sms => (self.sms_enabled, self.phone.as_deref()),
        };
        if enabled {
            recipient.filter(|r| !r.is_empty())
        } else {
            None
        }
    }

    /// Email recipient, iff the channel is enabled and a recipient is set
    pub fn email_recipient(&self) -> Option<&str> {
        self.wants(Channel::Email)
    }

    /// SMS recipient, iff the channel is enabled and a recipient is set
    pub fn sms_recipient(&self) -> Option<&str> {
        self.wants(Channel::Sms)
    }
}

/// Per-channel outcome of one dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelResult {
    /// Which channel was attempted
    pub channel: Channel,

    /// Whether the send succeeded
    pub success: bool,

    /// Error detail if it failed
    pub error: Option<String>,

    /// When the attempt completed
    pub sent_at: DateTime<Utc>,
}

/// Aggregate outcome of one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// At least one channel succeeded
    Delivered,
    /// Every attempted channel failed
    Failed,
    /// No channel was enabled with a usable recipient
    NoChannels,
}

/// Result of dispatching one condition across the configured channels.
///
/// Channels are independent: a failure on one never fails the others, and
/// the dispatch is Delivered iff at least one channel succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Aggregate outcome
    pub outcome: DispatchOutcome,

    /// Per-channel results, in no guaranteed order
    pub results: Vec<ChannelResult>,
}

impl DispatchReport {
    /// Report for a request with no usable channel
    pub fn no_channels() -> Self {
        Self {
            outcome: DispatchOutcome::NoChannels,
            results: Vec::new(),
        }
    }

    /// Aggregate per-channel results into a report
    pub fn from_results(results: Vec<ChannelResult>) -> Self {
        let outcome = if results.is_empty() {
            DispatchOutcome::NoChannels
        } else if results.iter().any(|r| r.success) {
            DispatchOutcome::Delivered
        } else {
            DispatchOutcome::Failed
        };
        Self { outcome, results }
    }

    /// Whether this dispatch counts as an overall success
    pub fn delivered(&self) -> bool {
        self.outcome == DispatchOutcome::Delivered
    }
}
