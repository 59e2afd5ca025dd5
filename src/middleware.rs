//! Request/response middleware composed around every auth call.
//!
//! DESIGN
//! ======
//! Interceptors are plain values in an explicit [`Pipeline`] owned by the
//! client, not hooks registered on a shared global. `on_request` runs in
//! registration order; `on_response` runs in reverse, so the outermost layer
//! sees the request first and the response last.
//!
//! TOKEN PRECEDENCE
//! ================
//! The session cookie (carried by the client's cookie jar) is primary and is
//! what the server validates first. [`BearerToken`] only adds the persisted
//! fallback as a header. [`ClearOnUnauthorized`] reconciles the two: once the
//! server answers 401, the fallback is dropped so a dead token is never
//! replayed.

#[cfg(test)]
#[path = "middleware_test.rs"]
mod tests;

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, Request, StatusCode, Url};

use crate::store::CredentialStore;

/// A layer that can inspect or amend requests and observe response statuses.
pub trait Middleware: Send + Sync {
    fn on_request(&self, _request: &mut Request) {}

    fn on_response(&self, _method: &Method, _url: &Url, _status: StatusCode) {}
}

// =============================================================================
// PIPELINE
// =============================================================================

#[derive(Clone, Default)]
pub struct Pipeline {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Logging, bearer attachment, then clear-on-401.
    #[must_use]
    pub fn standard(store: Arc<dyn CredentialStore>) -> Self {
        Self::new()
            .with(RequestLog)
            .with(BearerToken::new(Arc::clone(&store)))
            .with(ClearOnUnauthorized::new(store))
    }

    #[must_use]
    pub fn with(mut self, layer: impl Middleware + 'static) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn apply_request(&self, request: &mut Request) {
        for layer in &self.layers {
            layer.on_request(request);
        }
    }

    pub fn apply_response(&self, method: &Method, url: &Url, status: StatusCode) {
        for layer in self.layers.iter().rev() {
            layer.on_response(method, url, status);
        }
    }
}

// =============================================================================
// BUILT-IN LAYERS
// =============================================================================

/// Attaches `Authorization: Bearer <token>` when the store holds a token.
pub struct BearerToken {
    store: Arc<dyn CredentialStore>,
}

impl BearerToken {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

impl Middleware for BearerToken {
    fn on_request(&self, request: &mut Request) {
        let Some(token) = self.store.get() else {
            return;
        };
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("persisted token is not a valid header value; sending without it"),
        }
    }
}

/// Clears the persisted token whenever the server reports 401.
pub struct ClearOnUnauthorized {
    store: Arc<dyn CredentialStore>,
}

impl ClearOnUnauthorized {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

impl Middleware for ClearOnUnauthorized {
    fn on_response(&self, _method: &Method, url: &Url, status: StatusCode) {
        if status != StatusCode::UNAUTHORIZED {
            return;
        }
        match self.store.clear() {
            Ok(()) => tracing::debug!(path = url.path(), "unauthorized; cleared persisted token"),
            Err(e) => tracing::warn!(path = url.path(), error = %e, "unauthorized; failed to clear persisted token"),
        }
    }
}

/// Traces method, path, and status of every call. Never logs headers.
pub struct RequestLog;

impl Middleware for RequestLog {
    fn on_request(&self, request: &mut Request) {
        tracing::debug!(method = %request.method(), path = request.url().path(), "auth request");
    }

    fn on_response(&self, method: &Method, url: &Url, status: StatusCode) {
        tracing::debug!(%method, path = url.path(), status = status.as_u16(), "auth response");
    }
}
