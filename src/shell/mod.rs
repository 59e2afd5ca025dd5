//! Terminal application shell over the session controller.
//!
//! SYSTEM CONTEXT
//! ==============
//! The shell is the outer boundary: it maps subcommands onto routes, runs the
//! matching session operation, and writes the page for wherever the user ends
//! up. The dashboard is the only protected route and goes through the
//! [`AccessGate`].
//!
//! DESIGN
//! ======
//! - Output goes to a caller-supplied writer so the binary prints to stdout
//!   and tests capture into a buffer.
//! - Failed sign-ins and gated redirects report [`Status::Failure`]; the
//!   binary turns that into exit code 1.

pub mod forms;
pub mod pages;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use std::io::Write;

use clap::Subcommand;

use crate::gate::{AccessGate, Gated};
use crate::session::{SessionController, SessionState};
use crate::types::Operation;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("config error: {0}")]
    Config(#[from] crate::error::ConfigError),
    #[error("client error: {0}")]
    Client(#[from] crate::error::ClientError),
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

// =============================================================================
// ROUTES
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Dashboard,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
        }
    }

    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" => Some(Self::Home),
            "/login" => Some(Self::Login),
            "/register" => Some(Self::Register),
            "/dashboard" => Some(Self::Dashboard),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_protected(self) -> bool {
        matches!(self, Self::Dashboard)
    }
}

/// Where navigation landed and what to show there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Visit {
    pub route: Route,
    pub body: String,
    /// Set when the gate bounced the user off a protected route.
    pub redirected_from: Option<Route>,
}

/// Resolve `route` against the session snapshot, following a gate redirect.
#[must_use]
pub fn visit(route: Route, state: &SessionState, gate: &AccessGate) -> Visit {
    let body = match route {
        Route::Home => pages::home(state),
        Route::Login => pages::login(),
        Route::Register => pages::register(),
        Route::Dashboard => match gate.guard(state, pages::dashboard) {
            Gated::Render(body) => body,
            Gated::Pending => pages::pending(),
            Gated::Redirect(to) => {
                let target = Route::from_path(&to).filter(|r| !r.is_protected()).unwrap_or(Route::Login);
                tracing::debug!(from = route.path(), to = target.path(), "redirecting unauthenticated visit");
                let landed = visit(target, state, gate);
                return Visit { redirected_from: Some(route), ..landed };
            }
        },
    };
    Visit { route, body, redirected_from: None }
}

// =============================================================================
// COMMANDS
// =============================================================================

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the landing page.
    Home,
    /// Sign in and open the dashboard.
    Login {
        #[arg(long, env = "CHATWORLD_EMAIL")]
        email: String,
        #[arg(long, env = "CHATWORLD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and open the dashboard.
    Register {
        #[arg(long, env = "CHATWORLD_EMAIL")]
        email: String,
        #[arg(long, env = "CHATWORLD_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// End the session on the server and locally.
    Logout,
    /// Open the protected dashboard.
    Dashboard,
    /// Print the session state as JSON.
    Status,
}

/// Run one command against an already bootstrapped session.
///
/// # Errors
///
/// Returns an error only when writing output or serializing state fails.
/// Rejected credentials are reported in the output with [`Status::Failure`].
pub async fn run<W: Write>(
    command: Command,
    session: &SessionController,
    gate: &AccessGate,
    out: &mut W,
) -> Result<Status, ShellError> {
    match command {
        Command::Home => show(Route::Home, session, gate, out),
        Command::Dashboard => show(Route::Dashboard, session, gate, out),
        Command::Login { email, password } => {
            let form = match forms::validate_login(&email, &password) {
                Ok(form) => form,
                Err(problem) => return reject(problem, Route::Login, session, gate, out),
            };
            let result = session.login(&form.email, &form.password).await;
            if !result.success {
                let message = result.message_or(Operation::Login.rejection_fallback());
                return reject(&message, Route::Login, session, gate, out);
            }
            show(Route::Dashboard, session, gate, out)
        }
        Command::Register { email, password, name } => {
            let form = match forms::validate_register(&email, &password, &name) {
                Ok(form) => form,
                Err(problem) => return reject(problem, Route::Register, session, gate, out),
            };
            let result = session.register(&form.email, &form.password, &form.name).await;
            if !result.success {
                let message = result.message_or(Operation::Register.rejection_fallback());
                return reject(&message, Route::Register, session, gate, out);
            }
            show(Route::Dashboard, session, gate, out)
        }
        Command::Logout => {
            session.logout().await;
            writeln!(out, "Signed out.")?;
            show(Route::Home, session, gate, out)
        }
        Command::Status => {
            let json = serde_json::to_string_pretty(&session.state().view())?;
            writeln!(out, "{json}")?;
            Ok(Status::Success)
        }
    }
}

fn show<W: Write>(route: Route, session: &SessionController, gate: &AccessGate, out: &mut W) -> Result<Status, ShellError> {
    let landed = visit(route, &session.state(), gate);
    if let Some(from) = landed.redirected_from {
        writeln!(out, "Sign in to view {}.", from.path())?;
    }
    write!(out, "{}", landed.body)?;
    Ok(if landed.redirected_from.is_some() { Status::Failure } else { Status::Success })
}

fn reject<W: Write>(
    message: &str,
    route: Route,
    session: &SessionController,
    gate: &AccessGate,
    out: &mut W,
) -> Result<Status, ShellError> {
    writeln!(out, "Error: {message}")?;
    show(route, session, gate, out)?;
    Ok(Status::Failure)
}
