//! Core error types for bookline-core.
//!
//! Lifecycle operations recover locally from stale ids (treated as no-ops)
//! and reject duplicates with a typed result. Dispatcher and store failures
//! propagate to the caller and are never retried internally -- retry is a
//! caller policy.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Umbrella error type for bookline-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Reminder error: {0}")]
    Reminder(#[from] ReminderError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Follow-up error: {0}")]
    FollowUp(#[from] FollowUpError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Custom(String),
}

/// Errors from lifecycle mutations. User-correctable, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// A non-deleted item with the same title (case-insensitive) is already
    /// due on the same calendar day.
    #[error("Duplicate item '{title}' already scheduled on {day}")]
    Duplicate { title: String, day: NaiveDate },

    /// Titles are trimmed before validation; whitespace-only is empty.
    #[error("Item title must not be empty")]
    EmptyTitle,
}

/// Errors reported by the external notification dispatcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The user has not granted notification permission.
    #[error("Notification permission not granted")]
    NotAuthorized,

    /// Transport or OS-level failure delivering the request.
    #[error("Dispatcher transport failure: {0}")]
    Transport(String),
}

/// Errors from reminder scheduling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    /// The computed trigger is already in the past. Informational: the
    /// reminder is skipped, nothing is registered.
    #[error("Trigger {trigger_at} is in the past; reminder skipped")]
    PastTrigger { trigger_at: DateTime<Utc> },

    /// The due-minus-offset arithmetic left the representable range.
    #[error("Could not compute a trigger time")]
    InvalidTrigger,

    #[error("Dispatcher rejected the reminder: {0}")]
    Dispatcher(#[from] DispatchError),
}

impl ReminderError {
    /// Soft conditions are suitable for inline messages rather than
    /// failure paths.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            ReminderError::PastTrigger { .. } | ReminderError::InvalidTrigger
        )
    }
}

/// Errors from the external object store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Insert failed: {0}")]
    Insert(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("Save failed: {0}")]
    Save(String),

    #[error("Query failed: {0}")]
    Query(String),
}

/// Errors from follow-up derivation and retirement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FollowUpError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Reminder error: {0}")]
    Reminder(#[from] ReminderError),

    /// Best-effort batch retirement hit failures; the remaining follow-ups
    /// were still attempted.
    #[error("{} follow-up(s) failed to retire", .failures.len())]
    Partial { failures: Vec<StoreError> },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
