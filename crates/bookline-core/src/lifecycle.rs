//! Lifecycle management for schedulable items.
//!
//! One manager owns one collection. Every mutation goes through `&mut self`,
//! so operations on a collection are serialized by construction; different
//! managers never need to be ordered relative to each other.
//!
//! ## State transitions
//!
//! ```text
//! Active ──complete──> Completed ──undo_complete──> Active
//! Active | Completed ──delete──> (gone; terminal)
//! ```
//!
//! Completing a recurring item is a side-effecting transition: it both
//! retires the current occurrence's active obligation and spawns a new
//! active sibling elsewhere in the collection.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::diagnostics::{AuditAction, DiagnosticsSink};
use crate::error::LifecycleError;
use crate::item::SchedulableItem;

pub const DEFAULT_UNDO_CAPACITY: usize = 20;

const COMPONENT: &str = "lifecycle";

/// Owning collection of schedulable items with duplicate suppression and a
/// bounded delete-undo buffer.
pub struct LifecycleManager {
    items: Vec<SchedulableItem>,
    /// Recently deleted items, oldest evicted first once full.
    undo_ring: VecDeque<SchedulableItem>,
    undo_capacity: usize,
    sink: DiagnosticsSink,
}

impl LifecycleManager {
    pub fn new(sink: DiagnosticsSink) -> Self {
        Self::with_undo_capacity(sink, DEFAULT_UNDO_CAPACITY)
    }

    pub fn with_undo_capacity(sink: DiagnosticsSink, undo_capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            undo_ring: VecDeque::new(),
            undo_capacity: undo_capacity.max(1),
            sink,
        }
    }

    /// Rehydrate a manager from previously persisted items.
    pub fn with_items(sink: DiagnosticsSink, items: Vec<SchedulableItem>) -> Self {
        Self {
            items,
            undo_ring: VecDeque::new(),
            undo_capacity: DEFAULT_UNDO_CAPACITY,
            sink,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn items(&self) -> &[SchedulableItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&SchedulableItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Not-completed items due at or after `now`, soonest first.
    pub fn upcoming(&self, now: DateTime<Utc>) -> Vec<&SchedulableItem> {
        let mut due: Vec<&SchedulableItem> = self
            .items
            .iter()
            .filter(|i| !i.completed && i.due_at >= now)
            .collect();
        due.sort_by_key(|i| i.due_at);
        due
    }

    /// Not-completed items already past due as of `now`, oldest first.
    pub fn overdue(&self, now: DateTime<Utc>) -> Vec<&SchedulableItem> {
        let mut late: Vec<&SchedulableItem> = self
            .items
            .iter()
            .filter(|i| !i.completed && i.due_at < now)
            .collect();
        late.sort_by_key(|i| i.due_at);
        late
    }

    /// Duplicate suppression predicate: case-insensitive title match plus
    /// same calendar day. Time-of-day is deliberately ignored.
    ///
    /// Kept in one named place so the rule can be revisited without
    /// touching call sites.
    pub fn is_duplicate(candidate: &SchedulableItem, existing: &SchedulableItem) -> bool {
        existing.title.to_lowercase() == candidate.title.to_lowercase()
            && existing.due_day() == candidate.due_day()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Add an item to the collection.
    ///
    /// The title is trimmed first; empty titles and duplicates (per
    /// [`Self::is_duplicate`], checked against all non-deleted items) are
    /// rejected with a typed error. Whether a rejection is user-visible is
    /// the caller's decision.
    pub fn add(&mut self, mut item: SchedulableItem) -> Result<(), LifecycleError> {
        item.title = item.title.trim().to_string();
        if item.title.is_empty() {
            return Err(LifecycleError::EmptyTitle);
        }
        // The offset field is public; normalize it the same way the
        // builder does so a trigger never lands after the due moment.
        item.reminder_offset_min = item.reminder_offset_min.max(0);
        if let Some(existing) = self.items.iter().find(|e| Self::is_duplicate(&item, e)) {
            self.sink.record(
                COMPONENT,
                AuditAction::AddFailed,
                format!(
                    "'{}' duplicates '{}' on {}",
                    item.title,
                    existing.title,
                    existing.due_day()
                ),
            );
            return Err(LifecycleError::Duplicate {
                day: item.due_day(),
                title: item.title,
            });
        }
        self.sink.record(
            COMPONENT,
            AuditAction::Add,
            format!("'{}' due {}", item.title, item.due_at),
        );
        self.items.push(item);
        Ok(())
    }

    /// Mark an item completed and, for recurring items, spawn the next
    /// occurrence as a new active sibling.
    ///
    /// Unknown ids and already-completed items are no-ops, so a second
    /// `complete` never spawns a second occurrence. The spawn re-enters
    /// [`Self::add`], so duplicate suppression still applies; a suppressed
    /// spawn never rolls the completion back. Returns the spawned item's id
    /// when one was created.
    pub fn complete(&mut self, id: &str) -> Option<String> {
        let idx = self.items.iter().position(|i| i.id == id)?;
        if self.items[idx].completed {
            return None;
        }
        let now = Utc::now();
        self.items[idx].completed = true;
        self.items[idx].completed_at = Some(now);
        self.items[idx].updated_at = now;
        self.sink.record(
            COMPONENT,
            AuditAction::Complete,
            format!("'{}'", self.items[idx].title),
        );

        let next = self.items[idx].spawn_next()?;
        let next_id = next.id.clone();
        // Duplicate spawn is suppressed; the completion above stands.
        self.add(next).ok().map(|_| next_id)
    }

    /// Clear the completion flag.
    ///
    /// NOTE: does not retract a next occurrence that `complete` already
    /// spawned. Current behavior, pending product clarification.
    pub fn undo_complete(&mut self, id: &str) {
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return;
        };
        item.completed = false;
        item.completed_at = None;
        item.updated_at = Utc::now();
        let title = item.title.clone();
        self.sink
            .record(COMPONENT, AuditAction::UndoComplete, format!("'{title}'"));
    }

    /// Remove an item. Unknown ids are a no-op; returns the removed item.
    pub fn delete(&mut self, id: &str) -> Option<SchedulableItem> {
        let idx = self.items.iter().position(|i| i.id == id)?;
        let item = self.items.remove(idx);
        self.sink
            .record(COMPONENT, AuditAction::Delete, format!("'{}'", item.title));
        Some(item)
    }

    /// Remove an item and keep it in the bounded undo buffer so the most
    /// recent deletion can be restored.
    pub fn delete_with_undo(&mut self, id: &str) -> bool {
        let Some(item) = self.delete(id) else {
            return false;
        };
        if self.undo_ring.len() == self.undo_capacity {
            self.undo_ring.pop_front();
        }
        self.undo_ring.push_back(item);
        true
    }

    /// Restore the most recently deleted item by re-running `add`, so
    /// duplicate suppression still guards the restoration. Returns the
    /// restored id, or `Ok(None)` when there is nothing to restore.
    ///
    /// A rejected restore puts the item back on the ring: the deletion
    /// stays recoverable until the occupied slot frees up.
    pub fn undo_last_delete(&mut self) -> Result<Option<String>, LifecycleError> {
        let Some(item) = self.undo_ring.pop_back() else {
            return Ok(None);
        };
        let id = item.id.clone();
        let title = item.title.clone();
        if let Err(e) = self.add(item.clone()) {
            self.undo_ring.push_back(item);
            return Err(e);
        }
        self.sink
            .record(COMPONENT, AuditAction::UndoDelete, format!("'{title}'"));
        Ok(Some(id))
    }

    /// Full replace by id. Unknown ids are a no-op; returns whether a
    /// replacement happened.
    pub fn update(&mut self, mut item: SchedulableItem) -> bool {
        let Some(idx) = self.items.iter().position(|i| i.id == item.id) else {
            return false;
        };
        item.updated_at = Utc::now();
        self.sink
            .record(COMPONENT, AuditAction::Update, format!("'{}'", item.title));
        self.items[idx] = item;
        true
    }
}
