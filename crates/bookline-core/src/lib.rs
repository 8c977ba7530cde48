//! # Bookline Core Library
//!
//! Recurrence and reminder scheduling engine for small-business bookings,
//! recurring chores, and follow-ups. The engine computes future occurrences
//! from recurrence rules, manages the lifecycle of schedulable work items
//! (create / complete / undo / delete with duplicate suppression), converts
//! due moments into concrete trigger times for an external notification
//! dispatcher, and derives and retires follow-up items tied to a parent
//! event.
//!
//! ## Architecture
//!
//! - **Lifecycle Manager**: the single owner of an item collection; every
//!   mutation is serialized through it
//! - **Reminder Scheduler**: converts due times into dispatcher triggers and
//!   tracks outstanding reminder ids without owning item lifetime
//! - **Follow-up Scheduler**: derives work items from completed parents via
//!   the external [`Store`] and retires them when the parent is voided
//! - **Dispatcher / Store**: abstract external collaborators; the engine
//!   defines the interfaces only
//!
//! ## Key Components
//!
//! - [`RecurrenceRule`]: pure advance-one-period arithmetic
//! - [`LifecycleManager`]: add/complete/undo/delete with duplicate suppression
//! - [`ReminderScheduler`]: trigger computation and dispatcher delegation
//! - [`FollowUpScheduler`]: follow-up derivation and batch retirement
//! - [`DiagnosticsSink`]: shared bounded audit trail, diagnostics only

pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod followup;
pub mod item;
pub mod lifecycle;
pub mod recurrence;
pub mod reminder;
pub mod store;

pub use config::EngineConfig;
pub use diagnostics::{AuditAction, AuditEntry, DiagnosticsSink};
pub use dispatch::{AuthState, Dispatcher, DispatcherSession, NullDispatcher};
pub use error::{
    ConfigError, CoreError, DispatchError, FollowUpError, LifecycleError, ReminderError,
    StoreError,
};
pub use followup::FollowUpScheduler;
pub use item::{ItemKind, SchedulableItem};
pub use lifecycle::LifecycleManager;
pub use recurrence::RecurrenceRule;
pub use reminder::ReminderScheduler;
pub use store::{MemoryStore, Store};
