//! Schedulable work items.
//!
//! One `SchedulableItem` is one occurrence of a task or appointment that
//! needs a reminder. Completing a recurring item never mutates the rule on
//! the same id -- it spawns a fresh sibling occurrence instead (see
//! [`SchedulableItem::spawn_next`]).

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::recurrence::RecurrenceRule;

/// Kind of schedulable item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Standalone piece of work (chore, errand, follow-up).
    Task,
    /// One occurrence of a booked appointment.
    AppointmentOccurrence,
}

impl Default for ItemKind {
    fn default() -> Self {
        ItemKind::Task
    }
}

/// One occurrence of schedulable work.
///
/// Owned by the lifecycle manager that created it. The reminder scheduler
/// only ever holds the `id` as a weak back-reference for cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulableItem {
    /// Unique identifier, immutable after creation.
    pub id: String,
    pub kind: ItemKind,
    /// Display title, trimmed. Never empty once accepted by `add`.
    pub title: String,
    pub notes: Option<String>,
    /// Point in time the item is due.
    pub due_at: DateTime<Utc>,
    pub recurrence: RecurrenceRule,
    pub completed: bool,
    /// Minutes before `due_at` at which the reminder should fire (may be 0).
    pub reminder_offset_min: i64,
    /// Parent item id when this item was derived from a completion.
    /// Lookup-only back-reference; deleting the parent does not cascade.
    #[serde(default)]
    pub related_parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SchedulableItem {
    /// Create a new active item with default values.
    pub fn new(title: impl Into<String>, due_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        let title: String = title.into();
        SchedulableItem {
            id: format!("item-{}-{}", now.timestamp(), uuid::Uuid::new_v4()),
            kind: ItemKind::Task,
            title: title.trim().to_string(),
            notes: None,
            due_at,
            recurrence: RecurrenceRule::None,
            completed: false,
            reminder_offset_min: 0,
            related_parent_id: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = rule;
        self
    }

    /// Negative offsets are clamped to zero: a reminder never fires after
    /// the due moment.
    pub fn with_reminder_offset_min(mut self, minutes: i64) -> Self {
        self.reminder_offset_min = minutes.max(0);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Instant at which this item's reminder should fire.
    ///
    /// `None` when the subtraction leaves chrono's representable range.
    pub fn trigger_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
            .checked_sub_signed(Duration::minutes(self.reminder_offset_min))
    }

    /// Due moment of the next occurrence, per the recurrence rule.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.recurrence.next_occurrence(self.due_at)
    }

    /// Build the sibling occurrence spawned by completing this item.
    ///
    /// Fresh id, same title/notes/recurrence/offset, active. Never mutates
    /// `self`; returns `None` for non-recurring items.
    pub fn spawn_next(&self) -> Option<SchedulableItem> {
        let next = self.next_due()?;
        let mut item = SchedulableItem::new(self.title.clone(), next);
        item.kind = self.kind;
        item.notes = self.notes.clone();
        item.recurrence = self.recurrence;
        item.reminder_offset_min = self.reminder_offset_min;
        Some(item)
    }

    /// Calendar day of the due moment. Duplicate suppression compares days,
    /// not instants.
    pub fn due_day(&self) -> NaiveDate {
        self.due_at.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn new_trims_title() {
        let item = SchedulableItem::new("  Order shampoo  ", due());
        assert_eq!(item.title, "Order shampoo");
        assert!(!item.completed);
    }

    #[test]
    fn trigger_at_subtracts_offset() {
        let item = SchedulableItem::new("Call vet", due()).with_reminder_offset_min(30);
        assert_eq!(
            item.trigger_at().unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn zero_offset_triggers_at_due_time() {
        let item = SchedulableItem::new("Call vet", due());
        assert_eq!(item.trigger_at().unwrap(), due());
    }

    #[test]
    fn negative_offset_is_clamped_to_zero() {
        let item = SchedulableItem::new("Call vet", due()).with_reminder_offset_min(-60);
        assert_eq!(item.reminder_offset_min, 0);
        // The trigger never lands after the due moment.
        assert_eq!(item.trigger_at().unwrap(), due());
    }

    #[test]
    fn spawn_next_copies_fields_with_fresh_id() {
        let item = SchedulableItem::new("Water plants", due())
            .with_recurrence(RecurrenceRule::Weekly)
            .with_reminder_offset_min(15)
            .with_notes("back room too");

        let next = item.spawn_next().unwrap();
        assert_ne!(next.id, item.id);
        assert_eq!(next.title, item.title);
        assert_eq!(next.notes, item.notes);
        assert_eq!(next.recurrence, RecurrenceRule::Weekly);
        assert_eq!(next.reminder_offset_min, 15);
        assert_eq!(next.due_at, due() + Duration::days(7));
        assert!(!next.completed);
    }

    #[test]
    fn spawn_next_is_none_for_one_off_items() {
        let item = SchedulableItem::new("One-off", due());
        assert!(item.spawn_next().is_none());
    }

    #[test]
    fn item_serialization() {
        let item = SchedulableItem::new("Order shampoo", due())
            .with_kind(ItemKind::AppointmentOccurrence)
            .with_recurrence(RecurrenceRule::Monthly);

        let json = serde_json::to_string(&item).unwrap();
        let decoded: SchedulableItem = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.id, item.id);
        assert_eq!(decoded.kind, ItemKind::AppointmentOccurrence);
        assert_eq!(decoded.recurrence, RecurrenceRule::Monthly);
    }
}
