//! Data models for GovWatch

mod condition;
mod notification;
mod rule;
mod snapshot;

pub use condition::*;
pub use notification::*;
pub use rule::*;
pub use snapshot::*;
