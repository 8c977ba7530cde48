//! Reminder scheduling against the external dispatcher.
//!
//! The scheduler converts an item's due moment into a concrete trigger time
//! (`due_at - reminder_offset`) and registers it with the dispatcher. It
//! never owns item lifetime: only ids are retained, as weak back-references
//! for cancellation.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::diagnostics::{AuditAction, DiagnosticsSink};
use crate::dispatch::Dispatcher;
use crate::error::ReminderError;
use crate::item::SchedulableItem;

const COMPONENT: &str = "reminder";

/// Schedules, cancels, and reschedules reminders for items it does not own.
///
/// Shareable across background tasks (`Arc<ReminderScheduler>`); the
/// dispatcher is the single source of truth for what is actually pending.
pub struct ReminderScheduler {
    dispatcher: Arc<dyn Dispatcher>,
    sink: DiagnosticsSink,
    outstanding: Mutex<HashSet<String>>,
}

impl ReminderScheduler {
    pub fn new(dispatcher: Arc<dyn Dispatcher>, sink: DiagnosticsSink) -> Self {
        Self {
            dispatcher,
            sink,
            outstanding: Mutex::new(HashSet::new()),
        }
    }

    /// Register a reminder at `due_at - reminder_offset`.
    ///
    /// A trigger at or before `now` is skipped rather than scheduled --
    /// `PastTrigger` is informational, no dispatcher call is made.
    /// Dispatcher errors (authorization, transport) are surfaced and never
    /// retried here; retry is caller policy, typically on next foreground.
    pub fn schedule_reminder(
        &self,
        item: &SchedulableItem,
        now: DateTime<Utc>,
    ) -> Result<(), ReminderError> {
        let Some(trigger_at) = item.trigger_at() else {
            self.sink.record(
                COMPONENT,
                AuditAction::ReminderSkipped,
                format!("'{}': trigger out of range", item.title),
            );
            return Err(ReminderError::InvalidTrigger);
        };
        if trigger_at <= now {
            self.sink.record(
                COMPONENT,
                AuditAction::ReminderSkipped,
                format!("'{}': trigger {trigger_at} already passed", item.title),
            );
            return Err(ReminderError::PastTrigger { trigger_at });
        }

        let body = format!("Due {}", item.due_at.to_rfc3339());
        self.dispatcher
            .register(&item.id, trigger_at, &item.title, &body)?;
        self.lock_outstanding().insert(item.id.clone());
        self.sink.record(
            COMPONENT,
            AuditAction::ReminderScheduled,
            format!("'{}' at {trigger_at}", item.title),
        );
        Ok(())
    }

    /// Cancel a reminder. Idempotent: always succeeds locally, whether or
    /// not anything was registered.
    pub fn cancel_reminder(&self, id: &str) {
        self.dispatcher.unregister(id);
        self.lock_outstanding().remove(id);
        self.sink
            .record(COMPONENT, AuditAction::ReminderCancelled, id.to_string());
    }

    /// Cancel-then-schedule. Sequential is sufficient: duplicate-id
    /// registration is defined as replace, and the dispatcher is the single
    /// source of truth.
    pub fn reschedule_reminder(
        &self,
        item: &SchedulableItem,
        now: DateTime<Utc>,
    ) -> Result<(), ReminderError> {
        self.cancel_reminder(&item.id);
        self.schedule_reminder(item, now)
    }

    /// Ids this scheduler believes are registered, sorted for stable
    /// diagnostics output.
    pub fn outstanding(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock_outstanding().iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
        &self.dispatcher
    }

    fn lock_outstanding(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.outstanding.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::NullDispatcher;
    use crate::error::DispatchError;
    use chrono::{Duration, TimeZone};

    /// Dispatcher double that records calls and fails on demand.
    #[derive(Default)]
    struct RecordingDispatcher {
        registered: Mutex<Vec<(String, DateTime<Utc>)>>,
        fail_with: Mutex<Option<DispatchError>>,
    }

    impl RecordingDispatcher {
        fn register_count(&self) -> usize {
            self.registered.lock().unwrap().len()
        }

        fn set_failure(&self, err: DispatchError) {
            *self.fail_with.lock().unwrap() = Some(err);
        }
    }

    impl Dispatcher for RecordingDispatcher {
        fn request_authorization(&self) -> Result<bool, DispatchError> {
            Ok(true)
        }

        fn register(
            &self,
            id: &str,
            trigger_at: DateTime<Utc>,
            _title: &str,
            _body: &str,
        ) -> Result<(), DispatchError> {
            if let Some(err) = self.fail_with.lock().unwrap().clone() {
                return Err(err);
            }
            let mut registered = self.registered.lock().unwrap();
            registered.retain(|(rid, _)| rid != id); // replace semantics
            registered.push((id.to_string(), trigger_at));
            Ok(())
        }

        fn unregister(&self, id: &str) {
            self.registered.lock().unwrap().retain(|(rid, _)| rid != id);
        }

        fn pending_ids(&self) -> Vec<String> {
            self.registered
                .lock()
                .unwrap()
                .iter()
                .map(|(id, _)| id.clone())
                .collect()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn schedules_future_trigger() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let scheduler = ReminderScheduler::new(dispatcher.clone(), DiagnosticsSink::default());

        let item = SchedulableItem::new("Order shampoo", now() + Duration::hours(2))
            .with_reminder_offset_min(30);
        scheduler.schedule_reminder(&item, now()).unwrap();

        assert_eq!(dispatcher.register_count(), 1);
        assert_eq!(scheduler.outstanding(), vec![item.id.clone()]);
        let (_, trigger) = dispatcher.registered.lock().unwrap()[0].clone();
        assert_eq!(trigger, now() + Duration::minutes(90));
    }

    #[test]
    fn past_trigger_skips_without_dispatcher_call() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let scheduler = ReminderScheduler::new(dispatcher.clone(), DiagnosticsSink::default());

        // Offset >= time-until-due pushes the trigger into the past.
        let item = SchedulableItem::new("Order shampoo", now() + Duration::minutes(10))
            .with_reminder_offset_min(60);
        let err = scheduler.schedule_reminder(&item, now()).unwrap_err();

        assert!(matches!(err, ReminderError::PastTrigger { .. }));
        assert!(err.is_soft());
        assert_eq!(dispatcher.register_count(), 0);
        assert!(scheduler.outstanding().is_empty());
    }

    #[test]
    fn out_of_range_trigger_skips_without_dispatcher_call() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let scheduler = ReminderScheduler::new(dispatcher.clone(), DiagnosticsSink::default());

        // An offset of roughly two million years pushes the trigger off
        // the representable datetime range.
        let item = SchedulableItem::new("Ancient history", now())
            .with_reminder_offset_min(1_000_000_000_000);
        assert!(item.trigger_at().is_none());

        let err = scheduler.schedule_reminder(&item, now()).unwrap_err();
        assert_eq!(err, ReminderError::InvalidTrigger);
        assert!(err.is_soft());
        assert_eq!(dispatcher.register_count(), 0);
        assert!(scheduler.outstanding().is_empty());
    }

    #[test]
    fn dispatcher_failure_surfaces_without_retry() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        dispatcher.set_failure(DispatchError::NotAuthorized);
        let scheduler = ReminderScheduler::new(dispatcher.clone(), DiagnosticsSink::default());

        let item = SchedulableItem::new("Order shampoo", now() + Duration::hours(1));
        let err = scheduler.schedule_reminder(&item, now()).unwrap_err();

        assert_eq!(
            err,
            ReminderError::Dispatcher(DispatchError::NotAuthorized)
        );
        assert!(!err.is_soft());
        assert_eq!(dispatcher.register_count(), 0);
        assert!(scheduler.outstanding().is_empty());
    }

    #[test]
    fn cancel_is_idempotent() {
        let scheduler = ReminderScheduler::new(
            Arc::new(NullDispatcher::new()),
            DiagnosticsSink::default(),
        );
        // Nothing registered for this id; cancel still succeeds locally.
        scheduler.cancel_reminder("item-unknown");
        scheduler.cancel_reminder("item-unknown");
        assert!(scheduler.outstanding().is_empty());
    }

    #[test]
    fn reschedule_replaces_trigger() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let scheduler = ReminderScheduler::new(dispatcher.clone(), DiagnosticsSink::default());

        let mut item = SchedulableItem::new("Order shampoo", now() + Duration::hours(2));
        scheduler.schedule_reminder(&item, now()).unwrap();

        item.due_at = now() + Duration::hours(4);
        scheduler.reschedule_reminder(&item, now()).unwrap();

        assert_eq!(dispatcher.register_count(), 1);
        let (_, trigger) = dispatcher.registered.lock().unwrap()[0].clone();
        assert_eq!(trigger, now() + Duration::hours(4));
        assert_eq!(scheduler.outstanding(), vec![item.id.clone()]);
    }
}
