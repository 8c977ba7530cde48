//! Follow-up derivation and retirement.
//!
//! Completing a parent event can derive a follow-up work item N days later;
//! voiding the parent retires every follow-up that references it. The
//! parent/follow-up link is a lookup-only back-reference -- deleting the
//! parent never cascades on its own, it triggers the explicit retirement
//! pass here.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::diagnostics::{AuditAction, DiagnosticsSink};
use crate::error::FollowUpError;
use crate::item::{ItemKind, SchedulableItem};
use crate::reminder::ReminderScheduler;
use crate::store::Store;

pub const DEFAULT_FOLLOW_UP_OFFSET_DAYS: i64 = 10;

const COMPONENT: &str = "followup";

/// Derives follow-up items from completed parents and retires them when the
/// parent is voided.
pub struct FollowUpScheduler {
    store: Arc<dyn Store>,
    reminders: Arc<ReminderScheduler>,
    sink: DiagnosticsSink,
    offset_days: i64,
}

impl FollowUpScheduler {
    pub fn new(
        store: Arc<dyn Store>,
        reminders: Arc<ReminderScheduler>,
        sink: DiagnosticsSink,
    ) -> Self {
        Self {
            store,
            reminders,
            sink,
            offset_days: DEFAULT_FOLLOW_UP_OFFSET_DAYS,
        }
    }

    pub fn with_offset_days(mut self, days: i64) -> Self {
        self.offset_days = days;
        self
    }

    /// Derive a follow-up for a completed parent, insert it through the
    /// store, and schedule its reminder.
    ///
    /// Store failures are logged and surfaced, with no retry. A past
    /// trigger on the reminder is tolerated -- the follow-up itself still
    /// exists; hard dispatcher failures surface.
    pub fn schedule_follow_up(
        &self,
        parent: &SchedulableItem,
        now: DateTime<Utc>,
    ) -> Result<SchedulableItem, FollowUpError> {
        let due = parent.due_at + Duration::days(self.offset_days);
        let mut item =
            SchedulableItem::new(format!("Follow up: {}", parent.title), due).with_kind(ItemKind::Task);
        item.related_parent_id = Some(parent.id.clone());
        item.reminder_offset_min = parent.reminder_offset_min;

        if let Err(e) = self.store.insert(&item) {
            self.sink.record(
                COMPONENT,
                AuditAction::AddFailed,
                format!("'{}': {e}", item.title),
            );
            return Err(e.into());
        }
        self.sink.record(
            COMPONENT,
            AuditAction::FollowUpCreated,
            format!("'{}' due {due} (parent {})", item.title, parent.id),
        );

        match self.reminders.schedule_reminder(&item, now) {
            Ok(()) => {}
            // Skipped reminders were already audited by the scheduler.
            Err(e) if e.is_soft() => {}
            Err(e) => return Err(e.into()),
        }
        Ok(item)
    }

    /// Retire every follow-up referencing `parent_id`: delete it from the
    /// store and cancel its reminder.
    ///
    /// Best-effort batch: one failure does not stop the others; failures
    /// are aggregated into `FollowUpError::Partial`. Running this twice is
    /// a safe no-op the second time. Returns the number retired.
    pub fn cancel_follow_ups(&self, parent_id: &str) -> Result<usize, FollowUpError> {
        let children = self.store.fetch_by_parent(parent_id)?;
        let mut failures = Vec::new();
        let mut retired = 0usize;

        for child in &children {
            match self.store.delete(&child.id) {
                Ok(()) => {
                    self.reminders.cancel_reminder(&child.id);
                    self.sink.record(
                        COMPONENT,
                        AuditAction::FollowUpCancelled,
                        format!("'{}' (parent {parent_id})", child.title),
                    );
                    retired += 1;
                }
                Err(e) => failures.push(e),
            }
        }

        if failures.is_empty() {
            Ok(retired)
        } else {
            Err(FollowUpError::Partial { failures })
        }
    }
}
