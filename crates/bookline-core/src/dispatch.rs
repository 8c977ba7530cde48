//! External notification dispatcher interface and authorization session.
//!
//! The dispatcher is the only genuinely concurrent actor the engine talks
//! to. Permission is requested once per process; callers never block on the
//! outcome -- scheduling attempts made before it resolves are rejected by
//! the dispatcher and surfaced as `NotAuthorized`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::diagnostics::{AuditAction, DiagnosticsSink};
use crate::error::DispatchError;

const COMPONENT: &str = "dispatch";

/// Every notification backend implements this trait.
///
/// Registering an id that is already pending replaces the earlier
/// registration; unregistering an unknown id is a no-op.
pub trait Dispatcher: Send + Sync {
    /// One-shot permission request. May block; keep it off the hot path.
    fn request_authorization(&self) -> Result<bool, DispatchError>;

    /// Register a reminder to fire at `trigger_at`.
    fn register(
        &self,
        id: &str,
        trigger_at: DateTime<Utc>,
        title: &str,
        body: &str,
    ) -> Result<(), DispatchError>;

    /// Cancel a pending reminder. Unknown ids are not an error.
    fn unregister(&self, id: &str);

    /// Ids currently pending with the backend, for reconciliation.
    fn pending_ids(&self) -> Vec<String>;
}

/// Authorization progress for the process-wide dispatcher session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unrequested,
    Pending,
    Granted,
    Denied,
}

/// Process-wide authorization state, created once at startup. Clones share
/// the same state, so one session can be handed to every component that
/// schedules reminders.
#[derive(Clone)]
pub struct DispatcherSession {
    state: Arc<Mutex<AuthState>>,
    sink: DiagnosticsSink,
}

impl DispatcherSession {
    pub fn new(sink: DiagnosticsSink) -> Self {
        Self {
            state: Arc::new(Mutex::new(AuthState::Unrequested)),
            sink,
        }
    }

    pub fn state(&self) -> AuthState {
        *self.lock_state()
    }

    /// Kick off the one-shot permission request without blocking the
    /// caller. Only the first call transitions out of `Unrequested`; later
    /// calls are no-ops. Requires a running tokio runtime.
    pub fn authorize_in_background(&self, dispatcher: Arc<dyn Dispatcher>) {
        {
            let mut state = self.lock_state();
            if *state != AuthState::Unrequested {
                return;
            }
            *state = AuthState::Pending;
        }
        let session = self.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = dispatcher.request_authorization();
            session.resolve(outcome);
        });
    }

    /// Blocking variant for synchronous hosts.
    pub fn authorize_blocking(&self, dispatcher: &dyn Dispatcher) -> AuthState {
        {
            let mut state = self.lock_state();
            match *state {
                AuthState::Unrequested => *state = AuthState::Pending,
                AuthState::Pending => {}
                resolved => return resolved,
            }
        }
        self.resolve(dispatcher.request_authorization());
        self.state()
    }

    fn resolve(&self, outcome: Result<bool, DispatchError>) {
        let (next, detail) = match outcome {
            Ok(true) => (AuthState::Granted, "granted".to_string()),
            Ok(false) => (AuthState::Denied, "denied by user".to_string()),
            Err(e) => (AuthState::Denied, format!("request failed: {e}")),
        };
        *self.lock_state() = next;
        self.sink
            .record(COMPONENT, AuditAction::AuthorizationResolved, detail);
    }

    /// A poisoned lock means a writer panicked mid-transition; the state
    /// value itself is still a valid enum, so keep going.
    fn lock_state(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Dispatcher that delivers nothing: registrations are tracked in memory
/// only. Backs the CLI and any host without a notification center.
#[derive(Default)]
pub struct NullDispatcher {
    pending: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl NullDispatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Dispatcher for NullDispatcher {
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
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.insert(id.to_string(), trigger_at);
        Ok(())
    }

    fn unregister(&self, id: &str) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.remove(id);
    }

    fn pending_ids(&self) -> Vec<String> {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = pending.keys().cloned().collect();
        ids.sort();
        ids
    }
}
