//! HTTP routes for the login flow
//!
//! - GET /login   : redirect to the provider's authorization URL
//! - GET /callback: exchange the code, fetch and return the profile
//! - GET /health  : discovered provider summary
//! - GET /metrics : Prometheus text exposition

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use oidc_client::{AuthMode, DiscoveredClient};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::metrics;

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<DiscoveredClient>,
    pub auth_mode: AuthMode,
    pub prometheus: PrometheusHandle,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/login", get(login_handler))
        .route("/callback", get(callback_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Query string the provider appends to the redirect URI.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

async fn login_handler(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.client.authorization_url("code"))
}

async fn callback_handler(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let started = Instant::now();

    if let Some(error) = params.error {
        warn!(error = %error, description = ?params.error_description, "provider denied authorization");
        metrics::record_callback("denied", started.elapsed().as_secs_f64());
        return json_error(StatusCode::BAD_REQUEST, &error);
    }

    let Some(code) = params.code else {
        metrics::record_callback("denied", started.elapsed().as_secs_f64());
        return json_error(StatusCode::BAD_REQUEST, "missing_code");
    };

    let token = match state.client.try_access_token(&code, state.auth_mode).await {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, kind = e.kind(), mode = %state.auth_mode, "token exchange failed");
            metrics::record_provider_error("token", e.kind());
            metrics::record_callback("token_error", started.elapsed().as_secs_f64());
            return json_error(StatusCode::BAD_GATEWAY, "token_exchange_failed");
        }
    };

    let profile = match state.client.try_user_info(&token).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, kind = e.kind(), "userinfo fetch failed");
            metrics::record_provider_error("userinfo", e.kind());
            metrics::record_callback("userinfo_error", started.elapsed().as_secs_f64());
            return json_error(StatusCode::BAD_GATEWAY, "userinfo_failed");
        }
    };

    info!(sub = %profile.sub, client_id = %profile.client_id, "login completed");
    metrics::record_callback("success", started.elapsed().as_secs_f64());
    (StatusCode::OK, axum::Json(profile)).into_response()
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let endpoints = state.client.endpoints();
    (
        StatusCode::OK,
        axum::Json(json!({
            "status": "healthy",
            "provider": state.client.config().identity_provider_url,
            "authorization_endpoint": endpoints.authorization_endpoint,
            "scopes_supported": endpoints.scopes_supported,
            "auth_mode": state.auth_mode.as_str(),
        })),
    )
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}

fn json_error(status: StatusCode, error: &str) -> Response {
    (status, axum::Json(json!({ "error": error }))).into_response()
}
