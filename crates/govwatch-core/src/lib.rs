//! # GovWatch
//!
//! Alert monitoring and notification engine for AI model governance.
//!
//! GovWatch polls model and system health metrics from an external ML
//! analytics service, evaluates them against a fixed set of threshold
//! rules, applies a per-condition notification cooldown, and fans alerts
//! out across email and SMS with per-channel failure isolation.
//!
//! ## Architecture
//!
//! - **Evaluator**: pure threshold evaluation of a metrics snapshot
//! - **Cooldown ledger**: per-condition suppression of repeat notifications
//! - **Dispatcher**: concurrent multi-channel fan-out, joined per dispatch
//! - **Monitor**: the periodic scheduler plus the manual test-alert path
//!
//! ## Quick start
//!
//! ```bash
//! # Run the monitoring loop
//! govwatch serve
//!
//! # Probe the notification channels
//! govwatch test-alert --email oncall@example.com
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod config;
pub mod error;
pub mod models;
pub mod monitoring;
pub mod providers;

pub use config::Config;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::channels::{EmailTransport, SmsTransport};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
    pub use crate::monitoring::{CooldownLedger, Monitor, MonitorSettings, NotificationDispatcher};
    pub use crate::providers::MetricsProvider;
}
