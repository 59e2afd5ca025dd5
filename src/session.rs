//! Session controller: the single source of truth for "who is signed in".
//!
//! ARCHITECTURE
//! ============
//! One controller is built at startup and handed to every consumer by
//! reference. State is published on a `tokio::sync::watch` channel, so
//! consumers hold a receiver and re-derive their view on change. Nothing
//! outside this module mutates it.
//!
//! ```text
//!   Initializing ──check_auth──▶ Authenticated ◀──login/register──┐
//!        │                           │                             │
//!        └──────────────────▶ Unauthenticated ─────────────────────┘
//!                                    ▲
//!                         logout (always)
//! ```
//!
//! Initializing is left once and never re-entered. `loading` is derived: true
//! while Initializing, and while a login, register, or session check is in
//! flight.
//!
//! CONCURRENCY
//! ===========
//! Session-mutating calls are single-flight per controller: an async mutex is
//! held across the whole call, so a `logout` issued during a `login` waits for
//! the login to settle and then wins.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt as _;
use serde::Serialize;
use tokio::sync::{Mutex, watch};

use crate::client::AuthApi;
use crate::types::{AuthOutcome, AuthPayload, Operation, Outcome, User, UserPayload};

/// What login and register report back to the caller.
pub type LoginResult = Outcome<()>;

// =============================================================================
// STATE
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Authenticated(User),
    Unauthenticated,
}

/// Snapshot of the session. `authenticated` implies a user is present by
/// construction: the user lives inside [`Phase::Authenticated`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    phase: Phase,
    pending: bool,
}

impl SessionState {
    #[must_use]
    pub fn initializing() -> Self {
        Self { phase: Phase::Initializing, pending: false }
    }

    #[must_use]
    pub fn authenticated(user: User) -> Self {
        Self { phase: Phase::Authenticated(user), pending: false }
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self { phase: Phase::Unauthenticated, pending: false }
    }

    /// Mark a session-mutating call as in flight.
    #[must_use]
    pub fn with_pending(mut self, pending: bool) -> Self {
        self.pending = pending;
        self
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match &self.phase {
            Phase::Authenticated(user) => Some(user),
            Phase::Initializing | Phase::Unauthenticated => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.phase, Phase::Authenticated(_))
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pending || self.phase == Phase::Initializing
    }

    /// Flat `{ user, authenticated, loading }` view for serialization.
    #[must_use]
    pub fn view(&self) -> SessionView<'_> {
        SessionView { user: self.user(), authenticated: self.is_authenticated(), loading: self.is_loading() }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView<'a> {
    pub user: Option<&'a User>,
    pub authenticated: bool,
    pub loading: bool,
}

// =============================================================================
// CONTROLLER
// =============================================================================

pub struct SessionController {
    api: Arc<dyn AuthApi>,
    state: watch::Sender<SessionState>,
    flight: Mutex<()>,
}

impl SessionController {
    /// A controller in the Initializing phase. Call [`Self::check_auth`] to
    /// resolve it, or use [`Self::bootstrap`].
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>) -> Self {
        let (state, _) = watch::channel(SessionState::initializing());
        Self { api, state, flight: Mutex::new(()) }
    }

    /// Build a controller and resolve the current session.
    pub async fn bootstrap(api: Arc<dyn AuthApi>) -> Self {
        let controller = Self::new(api);
        controller.check_auth().await;
        controller
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Ask the server who we are. Anything short of a success carrying a user
    /// ends Unauthenticated with the fallback token discarded.
    pub async fn check_auth(&self) {
        let _flight = self.flight.lock().await;
        let _pending = PendingGuard::raise(&self.state);

        let outcome = contained(Operation::CurrentUser, self.api.current_user()).await;
        match outcome {
            Outcome { success: true, data: Some(UserPayload { user }), .. } => {
                tracing::info!(user_id = %user.id, "session restored");
                self.enter(Phase::Authenticated(user));
            }
            other => {
                tracing::debug!(
                    message = %other.message_or(Operation::CurrentUser.rejection_fallback()),
                    "no valid session"
                );
                self.api.discard_token();
                self.enter(Phase::Unauthenticated);
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> LoginResult {
        let _flight = self.flight.lock().await;
        let _pending = PendingGuard::raise(&self.state);
        let outcome = contained(Operation::Login, self.api.login(email, password)).await;
        self.settle(Operation::Login, outcome)
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> LoginResult {
        let _flight = self.flight.lock().await;
        let _pending = PendingGuard::raise(&self.state);
        let outcome = contained(Operation::Register, self.api.register(email, password, name)).await;
        self.settle(Operation::Register, outcome)
    }

    /// End the session. The server call is best-effort; the local session
    /// ends regardless of its outcome.
    pub async fn logout(&self) {
        let _flight = self.flight.lock().await;
        let outcome = contained(Operation::Logout, self.api.logout()).await;
        if !outcome.success {
            tracing::warn!(
                message = %outcome.message_or(Operation::Logout.rejection_fallback()),
                "server logout failed; ending local session anyway"
            );
        }
        self.api.discard_token();
        self.enter(Phase::Unauthenticated);
        tracing::info!("signed out");
    }

    /// Teardown: identical to [`Self::logout`].
    pub async fn shutdown(&self) {
        self.logout().await;
    }

    fn settle(&self, op: Operation, outcome: AuthOutcome) -> LoginResult {
        match outcome {
            Outcome { success: true, data: Some(AuthPayload { user, .. }), .. } => {
                tracing::info!(user_id = %user.id, operation = ?op, "signed in");
                self.enter(Phase::Authenticated(user));
                Outcome::done()
            }
            other => {
                tracing::debug!(operation = ?op, "sign-in rejected");
                Outcome::failure(other.message_or(op.rejection_fallback()))
            }
        }
    }

    fn enter(&self, phase: Phase) {
        self.state.send_replace(SessionState { phase, pending: false });
    }

}

/// Marks the session pending for the life of one call.
///
/// Dropping it clears `pending`, whether the call settled or its future was
/// cancelled. A session still Initializing at that point has nothing left
/// resolving it and becomes Unauthenticated.
struct PendingGuard<'a> {
    state: &'a watch::Sender<SessionState>,
}

impl<'a> PendingGuard<'a> {
    fn raise(state: &'a watch::Sender<SessionState>) -> Self {
        state.send_if_modified(|s| !std::mem::replace(&mut s.pending, true));
        Self { state }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|s| {
            let mut changed = std::mem::replace(&mut s.pending, false);
            if s.phase == Phase::Initializing {
                s.phase = Phase::Unauthenticated;
                changed = true;
            }
            changed
        });
    }
}

/// Run an auth call, turning a panic inside it into a transport-style failure.
async fn contained<T>(op: Operation, call: impl Future<Output = Outcome<T>>) -> Outcome<T> {
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::error!(operation = ?op, "auth call panicked");
            Outcome::failure(op.transport_fallback())
        }
    }
}
