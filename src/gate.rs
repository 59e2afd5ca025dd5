//! Access gate for protected views.
//!
//! The loading check comes before the authenticated check: a session that is
//! still resolving never redirects.

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;

use crate::session::SessionState;
use crate::types::User;

pub const DEFAULT_ENTRY_POINT: &str = "/login";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessDecision {
    /// Session still resolving: show a neutral pending indicator.
    Pending,
    /// Not signed in: send the user to this route.
    Redirect(String),
    Render,
}

/// Result of guarding a view: the rendered content only when allowed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Gated<T> {
    Pending,
    Redirect(String),
    Render(T),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessGate {
    entry_point: String,
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRY_POINT)
    }
}

impl AccessGate {
    #[must_use]
    pub fn new(entry_point: impl Into<String>) -> Self {
        Self { entry_point: entry_point.into() }
    }

    #[must_use]
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    #[must_use]
    pub fn decide(&self, state: &SessionState) -> AccessDecision {
        if state.is_loading() {
            AccessDecision::Pending
        } else if !state.is_authenticated() {
            AccessDecision::Redirect(self.entry_point.clone())
        } else {
            AccessDecision::Render
        }
    }

    /// Run `render` with the signed-in user only when the gate allows it.
    pub fn guard<T>(&self, state: &SessionState, render: impl FnOnce(&User) -> T) -> Gated<T> {
        match (self.decide(state), state.user()) {
            (AccessDecision::Pending, _) => Gated::Pending,
            (AccessDecision::Redirect(to), _) => Gated::Redirect(to),
            (AccessDecision::Render, Some(user)) => Gated::Render(render(user)),
            (AccessDecision::Render, None) => Gated::Redirect(self.entry_point.clone()),
        }
    }
}
