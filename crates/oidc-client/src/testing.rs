//! Local mock identity provider for tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Request, State};
use axum::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::Secret;
use tokio::net::TcpListener;

use crate::config::ClientConfig;

/// A request as seen by the mock provider. Header names are lowercase.
#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Clone)]
struct MockState {
    responses: Arc<HashMap<String, (u16, String)>>,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// HTTP server on 127.0.0.1 answering canned `(path, status, body)` routes.
/// Unknown paths get 404. The server stops when the value is dropped.
pub(crate) struct MockProvider {
    pub url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    server: tokio::task::JoinHandle<()>,
}

impl MockProvider {
    /// `routes` receives the server base URL so discovery documents can point
    /// back at the mock.
    pub(crate) async fn start<F>(routes: F) -> Self
    where
        F: FnOnce(&str) -> Vec<(&'static str, u16, String)>,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let url = format!("http://{addr}");

        let responses = routes(&url)
            .into_iter()
            .map(|(path, status, body)| (path.to_string(), (status, body)))
            .collect();
        let state = MockState {
            responses: Arc::new(responses),
            captured: Arc::new(Mutex::new(Vec::new())),
        };
        let captured = state.captured.clone();

        let app = axum::Router::new().fallback(respond).with_state(state);
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url,
            captured,
            server,
        }
    }

    pub(crate) fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> CapturedRequest {
        self.requests()
            .pop()
            .expect("mock provider received no requests")
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn respond(State(state): State<MockState>, request: Request) -> (StatusCode, String) {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, 1024 * 1024).await.unwrap();

    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                value.to_str().unwrap_or("").to_string(),
            )
        })
        .collect();
    let path = parts.uri.path().to_string();

    state.captured.lock().unwrap().push(CapturedRequest {
        method: parts.method.to_string(),
        path: path.clone(),
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    });

    match state.responses.get(&path) {
        Some((status, body)) => (StatusCode::from_u16(*status).unwrap(), body.clone()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

/// Discovery document whose endpoints live under `base`.
pub(crate) fn discovery_document(base: &str) -> String {
    serde_json::json!({
        "issuer": base,
        "authorization_endpoint": format!("{base}/authorize"),
        "token_endpoint": format!("{base}/token"),
        "userinfo_endpoint": format!("{base}/userinfo"),
        "end_session_endpoint": format!("{base}/logout"),
        "scopes_supported": ["openid", "profile", "email"],
    })
    .to_string()
}

pub(crate) fn profile_document() -> String {
    serde_json::json!({
        "sub": "jdoe",
        "service": "https://app/cb",
        "auth_time": 1735500000,
        "attributes": {
            "mail": "jdoe@example.com",
            "groups": ["staff", "admins"],
        },
        "id": "jdoe",
        "client_id": "abc",
    })
    .to_string()
}

pub(crate) fn test_config(provider_url: &str) -> ClientConfig {
    ClientConfig {
        client_id: "abc".into(),
        client_secret: Secret::new("s3cr3t".into()),
        redirect_uri: "https://app/cb".into(),
        scopes: "openid profile".into(),
        identity_provider_url: provider_url.into(),
    }
}

/// Decoded `Authorization: Basic` credentials, if present.
pub(crate) fn basic_credentials(request: &CapturedRequest) -> Option<(String, String)> {
    let encoded = request.headers.get("authorization")?.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded).ok()?).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

pub(crate) fn form_fields(request: &CapturedRequest) -> HashMap<String, String> {
    url::form_urlencoded::parse(request.body.as_bytes())
        .into_owned()
        .collect()
}
