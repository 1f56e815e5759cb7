//! In-memory alert history

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AlertCondition, DispatchReport};

/// One dispatched alert, as recorded for later inspection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Record identifier
    pub id: Uuid,
    /// The condition that was dispatched
    pub condition: AlertCondition,
    /// The dispatch report, per-channel results included
    pub report: DispatchReport,
    /// When the record was written
    pub recorded_at: DateTime<Utc>,
}

/// Bounded ring buffer of dispatched alerts.
///
/// Session state only: the buffer is reset on restart, and persistence is
/// an external collaborator's concern.
#[derive(Debug)]
pub struct AlertHistory {
    entries: Mutex<VecDeque<AlertRecord>>,
    capacity: usize,
}

impl AlertHistory {
    /// Create a history buffer holding at most `capacity` records
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity: capacity.max(1),
        }
    }

    /// Append a record, evicting the oldest once at capacity
    pub fn record(&self, condition: AlertCondition, report: DispatchReport) {
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(AlertRecord {
            id: Uuid::new_v4(),
            condition,
            report,
            recorded_at: Utc::now(),
        });
    }

    /// Most recent records first, at most `limit`
    pub fn recent(&self, limit: usize) -> Vec<AlertRecord> {
        let entries = self.entries.lock();
        entries.iter().rev().take(limit).cloned().collect()
    }

    /// Number of retained records
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether any alert has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
