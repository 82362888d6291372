//! Authorization code exchange
//!
//! POSTs the code to the token endpoint using one of two client
//! authentication modes:
//! 1. `Basic`: client_id/client_secret in HTTP Basic credentials
//! 2. `Post`: client_id/client_secret in the form body
//!
//! Both send `redirect_uri`, `grant_type=authorization_code`, `code` and
//! `scope` form-encoded.

use std::fmt;
use std::str::FromStr;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// How the client authenticates to the token endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// HTTP Basic credentials (`client_secret_basic`)
    #[default]
    Basic,
    /// Credentials in the form body (`client_secret_post`)
    Post,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Basic => "basic",
            AuthMode::Post => "post",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "basic" | "client_secret_basic" => Ok(AuthMode::Basic),
            "post" | "client_secret_post" => Ok(AuthMode::Post),
            other => Err(Error::UnknownAuthMode(other.to_owned())),
        }
    }
}

/// Token endpoint response.
///
/// Only `access_token` is required; its absence means the exchange failed.
/// `expires_in` is a delta in seconds from the response time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl AccessTokenResponse {
    /// `Authorization` header value: `<token_type> <access_token>`, verbatim.
    pub fn authorization_header(&self) -> Result<String> {
        let token_type = self.token_type.as_deref().ok_or(Error::MissingTokenType)?;
        Ok(format!("{token_type} {}", self.access_token))
    }
}

/// Form fields for the code exchange. Client credentials are only included
/// in `Post` mode.
pub fn token_form<'a>(
    config: &'a ClientConfig,
    code: &'a str,
    mode: AuthMode,
) -> Vec<(&'static str, &'a str)> {
    let mut form = vec![
        ("redirect_uri", config.redirect_uri.as_str()),
        ("grant_type", "authorization_code"),
        ("code", code),
        ("scope", config.scopes.as_str()),
    ];
    if mode == AuthMode::Post {
        form.push(("client_id", config.client_id.as_str()));
        form.push(("client_secret", config.client_secret.expose().as_str()));
    }
    form
}

/// Exchange an authorization code for tokens.
pub async fn exchange_code(
    client: &reqwest::Client,
    endpoint: &str,
    config: &ClientConfig,
    code: &str,
    mode: AuthMode,
) -> Result<AccessTokenResponse> {
    debug!(endpoint, %mode, "exchanging authorization code");

    let mut request = client
        .post(endpoint)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .form(&token_form(config, code, mode));

    if mode == AuthMode::Basic {
        request = request.basic_auth(&config.client_id, Some(config.client_secret.expose()));
    }

    let response = request
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Http(format!("reading token response: {e}")))?;

    if !status.is_success() {
        return Err(Error::TokenRejected {
            status: status.as_u16(),
            body,
        });
    }

    parse_token_response(&body)
}

/// Decode a token endpoint body. A JSON body without `access_token` is
/// `MissingAccessToken`, anything else malformed is `InvalidResponse`.
pub fn parse_token_response(body: &str) -> Result<AccessTokenResponse> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| Error::InvalidResponse(format!("token response is not JSON: {e}")))?;

    if value.get("access_token").is_none() {
        return Err(Error::MissingAccessToken);
    }

    serde_json::from_value(value)
        .map_err(|e| Error::InvalidResponse(format!("invalid token response: {e}")))
}
