//! Wire DTOs for the auth API boundary.
//!
//! DESIGN
//! ======
//! Every auth endpoint answers with the same envelope,
//! `{ success, data?, message? }`. [`Outcome`] models that envelope directly so
//! server responses pass through verbatim, and locally produced failures
//! (transport errors, unreadable bodies) use the same shape.

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

use reqwest::Method;
use serde::{Deserialize, Serialize};

// =============================================================================
// USER
// =============================================================================

/// An authenticated user as returned by the auth endpoints.
///
/// Replaced wholesale on every successful login, register, or session check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier. Document stores often send `_id`.
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    /// Optional display name chosen at registration.
    #[serde(default)]
    pub name: Option<String>,
}

impl User {
    /// Name to greet the user with: the display name when set, else the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.email,
        }
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// Normalized result of every auth operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), message: None }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, data: None, message: Some(message.into()) }
    }

    /// The server message when present and non-blank, otherwise `fallback`.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        match self.message.as_deref().map(str::trim) {
            Some(message) if !message.is_empty() => message.to_owned(),
            _ => fallback.to_owned(),
        }
    }
}

impl Outcome<()> {
    /// Bare success with no payload, as returned by the session controller.
    #[must_use]
    pub fn done() -> Self {
        Self { success: true, data: None, message: None }
    }
}

/// `data` of a register or login response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    /// Bearer token mirrored into the credential store when present.
    #[serde(default)]
    pub token: Option<String>,
}

/// `data` of a `/auth/me` response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub user: User,
}

pub type AuthOutcome = Outcome<AuthPayload>;
pub type UserOutcome = Outcome<UserPayload>;
/// Logout carries no meaningful payload.
pub type AckOutcome = Outcome<serde_json::Value>;

// =============================================================================
// REQUEST BODIES
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// The four calls the auth API exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    Logout,
    CurrentUser,
}

impl Operation {
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::CurrentUser => Method::GET,
            Self::Register | Self::Login | Self::Logout => Method::POST,
        }
    }

    /// Path relative to the configured API base URL.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Register => "/auth/register",
            Self::Login => "/auth/login",
            Self::Logout => "/auth/logout",
            Self::CurrentUser => "/auth/me",
        }
    }

    /// Message used when the call never produced a readable server outcome.
    #[must_use]
    pub fn transport_fallback(self) -> &'static str {
        match self {
            Self::Register => "Registration failed. Please try again.",
            Self::Login => "Login failed. Please try again.",
            Self::Logout => "Logout failed.",
            Self::CurrentUser => "Unable to verify session.",
        }
    }

    /// Message used when the server rejected the call without explaining why.
    #[must_use]
    pub fn rejection_fallback(self) -> &'static str {
        match self {
            Self::Register => "Registration failed",
            Self::Login => "Login failed",
            Self::Logout => "Logout failed",
            Self::CurrentUser => "Not authenticated",
        }
    }
}
