//! Configuration management for GovWatch

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Monitoring loop configuration
    pub monitor: MonitorConfig,

    /// Threshold rule parameters
    pub thresholds: ThresholdConfig,

    /// Notification channel configuration
    pub notifications: NotificationConfig,

    /// Metrics provider configuration
    pub metrics: MetricsProviderConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the environment, starting from defaults.
    ///
    /// Unset variables keep their default; a set-but-unparseable variable is
    /// a fatal configuration error, surfaced before monitoring begins.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = env_parse::<u32>("GOVWATCH_POLL_INTERVAL_MINUTES")? {
            config.monitor.poll_interval_minutes = v;
        }
        if let Some(v) = env_parse::<u64>("GOVWATCH_COOLDOWN_MINUTES")? {
            config.monitor.cooldown_minutes = v;
        }
        if let Some(v) = env_parse::<u64>("GOVWATCH_PROVIDER_TIMEOUT_SECS")? {
            config.monitor.provider_timeout_secs = v;
        }
        if let Some(v) = env_parse::<u64>("GOVWATCH_SEND_TIMEOUT_SECS")? {
            config.monitor.send_timeout_secs = v;
        }

        if let Some(v) = env_parse::<f64>("GOVWATCH_MIN_ACCURACY")? {
            config.thresholds.min_accuracy = v;
        }
        if let Some(v) = env_parse::<f64>("GOVWATCH_MAX_RESOURCE_USAGE")? {
            config.thresholds.max_resource_usage = v;
        }
        if let Some(v) = env_parse::<f64>("GOVWATCH_MAX_LATENCY_MS")? {
            config.thresholds.max_latency_ms = v;
        }
        if let Some(v) = env_parse::<f64>("GOVWATCH_DAILY_COST_LIMIT")? {
            config.thresholds.daily_cost_limit = v;
        }
        if let Some(v) = env_parse::<f64>("GOVWATCH_HALLUCINATION_CEILING")? {
            config.thresholds.hallucination_ceiling = v;
        }

        if let Some(v) = env_parse::<bool>("GOVWATCH_EMAIL_ENABLED")? {
            config.notifications.email_enabled = v;
        }
        if let Some(v) = env_parse::<bool>("GOVWATCH_SMS_ENABLED")? {
            config.notifications.sms_enabled = v;
        }
        config.notifications.alert_email =
            env_string("GOVWATCH_ALERT_EMAIL").or(config.notifications.alert_email);
        config.notifications.alert_phone =
            env_string("GOVWATCH_ALERT_PHONE").or(config.notifications.alert_phone);
        if let Some(v) = env_string("GOVWATCH_EMAIL_GATEWAY_URL") {
            config.notifications.email_gateway_url = v;
        }
        if let Some(v) = env_string("GOVWATCH_SMS_GATEWAY_URL") {
            config.notifications.sms_gateway_url = v;
        }
        if let Some(v) = env_string("GOVWATCH_EMAIL_FROM") {
            config.notifications.email_from = v;
        }

        if let Some(v) = env_string("GOVWATCH_METRICS_URL") {
            config.metrics.base_url = v;
        }

        if let Some(v) = env_string("GOVWATCH_LOG_LEVEL") {
            config.logging.level = v;
        }

        Ok(config)
    }
}

/// Monitoring loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Polling interval in minutes
    pub poll_interval_minutes: u32,
    /// Notification cooldown per condition key, in minutes
    pub cooldown_minutes: u64,
    /// Timeout for one metrics snapshot pull, in seconds
    pub provider_timeout_secs: u64,
    /// Timeout for one channel send, in seconds
    pub send_timeout_secs: u64,
    /// Number of dispatched alerts retained in the in-memory history
    pub history_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_minutes: 5,
            cooldown_minutes: 5,
            provider_timeout_secs: 5,
            send_timeout_secs: 5,
            history_capacity: 256,
        }
    }
}

/// Threshold rule parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Model accuracy floor (0-1); accuracy strictly below alerts
    pub min_accuracy: f64,
    /// Resource usage ceiling (0-1); usage strictly above alerts
    pub max_resource_usage: f64,
    /// Mean API latency ceiling in milliseconds
    pub max_latency_ms: f64,
    /// Daily LLM spend ceiling in currency units
    pub daily_cost_limit: f64,
    /// Hallucination rate ceiling (0-1)
    pub hallucination_ceiling: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_accuracy: 0.70,
            max_resource_usage: 0.80,
            max_latency_ms: 1000.0,
            daily_cost_limit: 100.0,
            hallucination_ceiling: 0.05,
        }
    }
}

/// Notification channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Whether the email channel is enabled
    pub email_enabled: bool,
    /// Whether the SMS channel is enabled
    pub sms_enabled: bool,
    /// Recipient address for alert emails
    pub alert_email: Option<String>,
    /// Recipient number for alert SMS
    pub alert_phone: Option<String>,
    /// Email gateway service endpoint
    pub email_gateway_url: String,
    /// SMS gateway service endpoint
    pub sms_gateway_url: String,
    /// Sender address on outgoing email
    pub email_from: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            email_enabled: true,
            sms_enabled: false,
            alert_email: None,
            alert_phone: None,
            email_gateway_url: "http://localhost:8025/api/v1/send".to_string(),
            sms_gateway_url: "http://localhost:8026/api/v1/send".to_string(),
            email_from: "alerts@govwatch.local".to_string(),
        }
    }
}

/// Metrics provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsProviderConfig {
    /// Base URL of the ML analytics service
    pub base_url: String,
}

impl Default for MetricsProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env_string(key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::config(format!("invalid value for {key}: {raw:?}"))),
        None => Ok(None),
    }
}
