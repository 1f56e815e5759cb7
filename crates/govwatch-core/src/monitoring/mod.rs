//! Alert monitoring engine
//!
//! Periodic threshold evaluation, per-key notification cooldown, and
//! multi-channel dispatch with failure isolation.

mod cooldown;
mod dispatcher;
mod evaluator;
mod history;
mod scheduler;

pub use cooldown::CooldownLedger;
pub use dispatcher::NotificationDispatcher;
pub use evaluator::evaluate;
pub use history::{AlertHistory, AlertRecord};
pub use scheduler::{Monitor, MonitorSettings, TestAlertReport};
