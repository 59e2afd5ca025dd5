//! ChatWorld client-side authentication.
//!
//! SYSTEM CONTEXT
//! ==============
//! Talks to the ChatWorld REST auth API (`/auth/register`, `/auth/login`,
//! `/auth/logout`, `/auth/me`). The server's HTTP-only session cookie is the
//! primary credential; a bearer token mirrored into a [`store::CredentialStore`]
//! is the fallback.
//!
//! ARCHITECTURE
//! ============
//! - [`client`]: HTTP transport with a [`middleware::Pipeline`] on every call.
//! - [`session`]: the process-wide session state machine.
//! - [`gate`]: pending/redirect/render decisions for protected views.
//! - [`shell`]: the terminal application built on the three above.

pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod middleware;
pub mod session;
pub mod shell;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
