//! In-process mock of the auth API for HTTP-level tests.
//!
//! Issues `tok-<n>` tokens both as an HTTP-only `token` cookie and (unless
//! disabled) in the response body, and accepts either on `/auth/me`. Every
//! request's `Authorization` and `Cookie` headers are recorded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::client::AuthClient;
use crate::config::{ClientConfig, ClientTimeouts};
use crate::store::CredentialStore;

pub const GOOD_PASSWORD: &str = "correct-horse";

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub cookie: Option<String>,
}

#[derive(Default)]
struct MockState {
    /// email -> (password, user json)
    users: HashMap<String, (String, Value)>,
    /// live token -> email
    sessions: HashMap<String, String>,
    seen: Vec<SeenRequest>,
    next_id: u32,
    omit_body_token: bool,
    logout_fails: bool,
    force_unauthorized: bool,
}

/// Handle for configuring and inspecting a running mock server.
#[derive(Clone, Default)]
pub struct MockAuth {
    inner: Arc<Mutex<MockState>>,
}

impl MockAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user that can log in with [`GOOD_PASSWORD`].
    pub fn with_user(self, email: &str, name: &str) -> Self {
        {
            let mut state = self.inner.lock().unwrap();
            state.next_id += 1;
            let user = json!({ "id": format!("u{}", state.next_id), "email": email, "name": name });
            state.users.insert(email.to_owned(), (GOOD_PASSWORD.to_owned(), user));
        }
        self
    }

    /// Issue tokens only as cookies, never in the response body.
    pub fn cookie_only(self) -> Self {
        self.inner.lock().unwrap().omit_body_token = true;
        self
    }

    pub fn set_logout_fails(&self, fails: bool) {
        self.inner.lock().unwrap().logout_fails = fails;
    }

    /// Answer every endpoint with 401.
    pub fn set_force_unauthorized(&self, force: bool) {
        self.inner.lock().unwrap().force_unauthorized = force;
    }

    /// Invalidate every issued token, as if the sessions expired server-side.
    pub fn expire_sessions(&self) {
        self.inner.lock().unwrap().sessions.clear();
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.inner.lock().unwrap().seen.clone()
    }

    pub fn last_seen(&self, path: &str) -> Option<SeenRequest> {
        self.seen().into_iter().rev().find(|r| r.path == path)
    }

    fn record(&self, path: &str, headers: &HeaderMap) -> bool {
        let header_str =
            |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
        let mut state = self.inner.lock().unwrap();
        state.seen.push(SeenRequest {
            path: path.to_owned(),
            authorization: header_str(header::AUTHORIZATION),
            cookie: header_str(header::COOKIE),
        });
        state.force_unauthorized
    }

    fn issue(&self, email: &str, user: Value, status: StatusCode) -> Response {
        let mut state = self.inner.lock().unwrap();
        state.next_id += 1;
        let token = format!("tok-{}", state.next_id);
        state.sessions.insert(token.clone(), email.to_owned());
        let data = if state.omit_body_token {
            json!({ "user": user })
        } else {
            json!({ "user": user, "token": token })
        };
        let cookie = format!("token={token}; Path=/; HttpOnly");
        (status, [(header::SET_COOKIE, cookie)], Json(json!({ "success": true, "data": data }))).into_response()
    }

    fn presented_token(headers: &HeaderMap) -> Option<String> {
        let from_cookie = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|raw| raw.split(';').map(str::trim).find_map(|pair| pair.strip_prefix("token=")))
            .filter(|t| !t.is_empty())
            .map(str::to_owned);
        from_cookie.or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|raw| raw.strip_prefix("Bearer "))
                .map(str::to_owned)
        })
    }
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "success": false, "message": message }))).into_response()
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn register(State(mock): State<MockAuth>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if mock.record("/auth/register", &headers) {
        return unauthorized("Not authorized");
    }
    let email = body["email"].as_str().unwrap_or_default().to_owned();
    let password = body["password"].as_str().unwrap_or_default().to_owned();
    let name = body["name"].as_str().unwrap_or_default().to_owned();

    let user = {
        let mut state = mock.inner.lock().unwrap();
        if state.users.contains_key(&email) {
            return (StatusCode::BAD_REQUEST, Json(json!({ "success": false, "message": "User already exists" })))
                .into_response();
        }
        state.next_id += 1;
        let user = json!({ "_id": format!("u{}", state.next_id), "email": email, "name": name });
        state.users.insert(email.clone(), (password, user.clone()));
        user
    };
    mock.issue(&email, user, StatusCode::CREATED)
}

async fn login(State(mock): State<MockAuth>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if mock.record("/auth/login", &headers) {
        return unauthorized("Not authorized");
    }
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let user = {
        let state = mock.inner.lock().unwrap();
        match state.users.get(email) {
            Some((expected, user)) if expected == password => user.clone(),
            _ => return unauthorized("Invalid email or password"),
        }
    };
    mock.issue(email, user, StatusCode::OK)
}

async fn logout(State(mock): State<MockAuth>, headers: HeaderMap) -> Response {
    if mock.record("/auth/logout", &headers) {
        return unauthorized("Not authorized");
    }
    let mut state = mock.inner.lock().unwrap();
    if state.logout_fails {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    if let Some(token) = MockAuth::presented_token(&headers) {
        state.sessions.remove(&token);
    }
    (
        StatusCode::OK,
        [(header::SET_COOKIE, "token=; Path=/; HttpOnly; Max-Age=0")],
        Json(json!({ "success": true, "message": "Logged out" })),
    )
        .into_response()
}

async fn me(State(mock): State<MockAuth>, headers: HeaderMap) -> Response {
    if mock.record("/auth/me", &headers) {
        return unauthorized("Not authorized");
    }
    let state = mock.inner.lock().unwrap();
    let user = MockAuth::presented_token(&headers)
        .and_then(|token| state.sessions.get(&token))
        .and_then(|email| state.users.get(email))
        .map(|(_, user)| user.clone());
    match user {
        Some(user) => Json(json!({ "success": true, "data": { "user": user } })).into_response(),
        None => unauthorized("Not authorized, no token"),
    }
}

// =============================================================================
// SPAWN
// =============================================================================

/// Serve the mock on an ephemeral port and return its API base URL.
pub async fn spawn_mock_server(mock: MockAuth) -> String {
    let app = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// A base URL on which nothing is listening.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

pub fn test_client(base_url: &str, store: Arc<dyn CredentialStore>) -> AuthClient {
    let mut config = ClientConfig::new(base_url).unwrap();
    config.timeouts = ClientTimeouts { request_secs: 5, connect_secs: 2 };
    AuthClient::new(config, store).unwrap()
}
