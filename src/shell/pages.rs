//! Plain-text pages for the terminal shell.
//!
//! Each page is a pure function of the session snapshot so it can be tested
//! without a server.

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;

use std::fmt::Write as _;

use crate::session::SessionState;
use crate::types::User;

pub const BRAND: &str = "ChatWorld";
pub const PENDING: &str = "Checking your session...";

/// Landing page. Signed-in users get a greeting and a dashboard link.
#[must_use]
pub fn home(state: &SessionState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{BRAND}");
    match state.user() {
        Some(user) => {
            let _ = writeln!(out, "  Welcome, {}!", user.display_name());
            let _ = writeln!(out, "  Dashboard: chatworld dashboard");
        }
        _ if state.is_loading() => {
            let _ = writeln!(out, "  {PENDING}");
        }
        _ => {
            let _ = writeln!(out, "  Sign In: chatworld login --email <email> --password <password>");
            let _ = writeln!(out, "  Get Started: chatworld register --email <email> --password <password> --name <name>");
        }
    }
    out.push('\n');
    let _ = writeln!(out, "Welcome to {BRAND}");
    let _ = writeln!(out, "Connect, chat, and collaborate with people around the world.");
    out.push('\n');
    let _ = writeln!(out, "Features");
    let _ = writeln!(out, "  Real-time Chat: messages arrive instantly.");
    let _ = writeln!(out, "  Secure & Private: your conversations stay yours.");
    let _ = writeln!(out, "  Connect Globally: meet people from anywhere.");
    out
}

/// Protected page body; only reachable through the access gate.
#[must_use]
pub fn dashboard(user: &User) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dashboard");
    let _ = writeln!(out, "  Signed in as {}", user.display_name());
    let _ = writeln!(out, "  id:    {}", user.id);
    let _ = writeln!(out, "  email: {}", user.email);
    if let Some(name) = user.name.as_deref().filter(|n| !n.is_empty()) {
        let _ = writeln!(out, "  name:  {name}");
    }
    let _ = writeln!(out, "  Sign out: chatworld logout");
    out
}

#[must_use]
pub fn login() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sign In");
    let _ = writeln!(out, "  chatworld login --email <email> --password <password>");
    let _ = writeln!(out, "  No account yet? chatworld register --email <email> --password <password> --name <name>");
    out
}

#[must_use]
pub fn register() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Create Account");
    let _ = writeln!(out, "  chatworld register --email <email> --password <password> --name <name>");
    let _ = writeln!(out, "  Already registered? chatworld login --email <email> --password <password>");
    out
}

#[must_use]
pub fn pending() -> String {
    format!("{PENDING}\n")
}
