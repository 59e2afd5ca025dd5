//! Auth API client.
//!
//! SYSTEM CONTEXT
//! ==============
//! The only component that talks to the auth server and the only writer of
//! the credential store. Every call runs through the middleware [`Pipeline`]
//! (bearer attachment, clear-on-401, tracing), and cookies ride along through
//! reqwest's cookie jar.
//!
//! ERROR HANDLING
//! ==============
//! Operations return an [`Outcome`] and never an `Err`. Server rejections pass
//! through as the server phrased them; transport failures and unreadable
//! bodies become `success: false` with a per-operation fallback message.

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::middleware::Pipeline;
use crate::store::CredentialStore;
use crate::types::{
    AckOutcome, AuthOutcome, LoginRequest, Operation, Outcome, RegisterRequest, UserOutcome,
};

// =============================================================================
// AUTH API TRAIT
// =============================================================================

/// The auth operations the session controller depends on. Enables mocking in tests.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/register`. Mirrors a returned token into the store.
    async fn register(&self, email: &str, password: &str, name: &str) -> AuthOutcome;

    /// `POST /auth/login`. Mirrors a returned token into the store.
    async fn login(&self, email: &str, password: &str) -> AuthOutcome;

    /// `POST /auth/logout`. Clears the store whatever the server says.
    async fn logout(&self) -> AckOutcome;

    /// `GET /auth/me`.
    async fn current_user(&self) -> UserOutcome;

    /// Drop the persisted fallback token. The only store access offered to
    /// other components.
    fn discard_token(&self);
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct AuthClient {
    http: reqwest::Client,
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
    pipeline: Pipeline,
}

impl AuthClient {
    /// Build a client with the standard middleware pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ClientError> {
        let pipeline = Pipeline::standard(Arc::clone(&store));
        Self::with_pipeline(config, store, pipeline)
    }

    /// Build a client with a caller-supplied middleware pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_pipeline(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        pipeline: Pipeline,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| ClientError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config, store, pipeline })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn call<B, T>(&self, op: Operation, body: Option<&B>) -> Outcome<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        match self.send(op, body).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(operation = ?op, error = %e, "auth call failed");
                Outcome::failure(op.transport_fallback())
            }
        }
    }

    async fn send<B, T>(&self, op: Operation, body: Option<&B>) -> Result<Outcome<T>, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let builder = self.http.request(op.method(), self.config.endpoint(op.path()));
        let builder = if let Some(json) = body { builder.json(json) } else { builder };
        let mut request = builder.build()?;

        self.pipeline.apply_request(&mut request);
        let method = request.method().clone();
        let url = request.url().clone();

        let response = self.http.execute(request).await?;
        let status = response.status();
        self.pipeline.apply_response(&method, &url, status);

        let text = response.text().await?;
        interpret(op, status, &text)
    }

    fn mirror_token(&self, outcome: &AuthOutcome) {
        let Some(token) = outcome
            .data
            .as_ref()
            .and_then(|data| data.token.as_deref())
            .filter(|token| !token.trim().is_empty())
        else {
            return;
        };
        if let Err(e) = self.store.set(token) {
            tracing::warn!(error = %e, "failed to persist bearer token");
        }
    }
}

#[async_trait::async_trait]
impl AuthApi for AuthClient {
    async fn register(&self, email: &str, password: &str, name: &str) -> AuthOutcome {
        let body = RegisterRequest { email, password, name };
        let outcome = self.call(Operation::Register, Some(&body)).await;
        self.mirror_token(&outcome);
        outcome
    }

    async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        let body = LoginRequest { email, password };
        let outcome = self.call(Operation::Login, Some(&body)).await;
        self.mirror_token(&outcome);
        outcome
    }

    async fn logout(&self) -> AckOutcome {
        let outcome = self.call(Operation::Logout, None::<&()>).await;
        self.discard_token();
        outcome
    }

    async fn current_user(&self) -> UserOutcome {
        self.call(Operation::CurrentUser, None::<&()>).await
    }

    fn discard_token(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear persisted token");
        }
    }
}

// =============================================================================
// RESPONSE INTERPRETATION
// =============================================================================

/// Turn a status and raw body into an outcome.
///
/// 2xx bodies must be a well-formed envelope and pass through verbatim; an
/// empty 2xx body (e.g. `204 No Content`) is a bare success. Anything else is
/// a failure carrying the body's `message` (or `error`) when one can be read,
/// else the operation's fallback.
pub(crate) fn interpret<T: DeserializeOwned>(
    op: Operation,
    status: StatusCode,
    body: &str,
) -> Result<Outcome<T>, ClientError> {
    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(Outcome { success: true, data: None, message: None });
        }
        return Ok(serde_json::from_str(body)?);
    }

    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(serde_json::Value::as_str).map(str::to_owned))
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| op.transport_fallback().to_owned());
    Ok(Outcome::failure(message))
}
