//! Bounded audit trail shared across engine components.
//!
//! One injected sink replaces the per-component ring buffers the engine
//! grew out of. The trail is diagnostics only: recording never blocks or
//! fails the operation being logged, and entries are dropped (oldest first)
//! once the buffer is full.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AUDIT_CAPACITY: usize = 50;

/// What happened, from the engine's point of view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Add,
    AddFailed,
    Complete,
    UndoComplete,
    Delete,
    UndoDelete,
    Update,
    ReminderScheduled,
    ReminderSkipped,
    ReminderCancelled,
    FollowUpCreated,
    FollowUpCancelled,
    AuthorizationResolved,
}

/// One audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    pub component: String,
    pub action: AuditAction,
    pub detail: String,
}

/// Shared, bounded diagnostics sink with strict FIFO eviction.
///
/// Cheap to clone; clones share the same buffer. Single writer at a time is
/// enforced by the mutex, readers take snapshots.
#[derive(Debug, Clone)]
pub struct DiagnosticsSink {
    entries: Arc<Mutex<VecDeque<AuditEntry>>>,
    capacity: usize,
}

impl DiagnosticsSink {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Record an entry. A poisoned lock drops the entry instead of
    /// propagating the panic into the operation being logged.
    pub fn record(&self, component: &str, action: AuditAction, detail: impl Into<String>) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(AuditEntry {
            at: Utc::now(),
            component: component.to_string(),
            action,
            detail: detail.into(),
        });
    }

    /// Copy of the current trail, oldest entry first.
    pub fn snapshot(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for DiagnosticsSink {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let sink = DiagnosticsSink::new(10);
        sink.record("lifecycle", AuditAction::Add, "first");
        sink.record("reminder", AuditAction::ReminderScheduled, "second");

        let trail = sink.snapshot();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].detail, "first");
        assert_eq!(trail[1].detail, "second");
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let sink = DiagnosticsSink::new(3);
        for i in 0..5 {
            sink.record("lifecycle", AuditAction::Add, format!("entry-{i}"));
        }

        let trail = sink.snapshot();
        assert_eq!(trail.len(), 3);
        assert_eq!(trail[0].detail, "entry-2");
        assert_eq!(trail[2].detail, "entry-4");
    }

    #[test]
    fn clones_share_one_buffer() {
        let sink = DiagnosticsSink::new(10);
        let other = sink.clone();
        other.record("lifecycle", AuditAction::Delete, "shared");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let sink = DiagnosticsSink::new(0);
        sink.record("lifecycle", AuditAction::Add, "kept");
        assert_eq!(sink.len(), 1);
    }
}
