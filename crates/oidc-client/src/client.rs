//! Client state machine: `OidcClient` (undiscovered) -> `DiscoveredClient`
//!
//! Only a `DiscoveredClient` can build authorization URLs or talk to the
//! token and userinfo endpoints, so calling them before discovery is a type
//! error instead of a runtime one. A failed discovery leaves the
//! `OidcClient` untouched and it can simply be retried.

use std::path::Path;

use tracing::{info, warn};

use crate::authorize::build_authorization_url;
use crate::config::ClientConfig;
use crate::discovery::{self, ProviderEndpoints};
use crate::error::Result;
use crate::token::{self, AccessTokenResponse, AuthMode};
use crate::userinfo::{self, ProfileResponse};

/// Configured client that has not discovered its provider yet.
#[derive(Debug, Clone)]
pub struct OidcClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl OidcClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Use a caller-built HTTP client (proxies, custom TLS roots, timeouts).
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Discovery document URL for the configured provider.
    pub fn well_known_url(&self) -> String {
        discovery::well_known_url(&self.config.identity_provider_url)
    }

    /// Fetch the provider's endpoints. Single attempt, no retry.
    pub async fn discover(&self) -> Result<DiscoveredClient> {
        let endpoints = discovery::discover(&self.http, &self.config.identity_provider_url)
            .await
            .inspect_err(|e| warn!(error = %e, "endpoint discovery failed"))?;

        info!(
            provider = %self.config.identity_provider_url,
            authorization_endpoint = %endpoints.authorization_endpoint,
            scopes_supported = endpoints.scopes_supported.len(),
            "discovered provider endpoints"
        );

        Ok(DiscoveredClient {
            config: self.config.clone(),
            http: self.http.clone(),
            endpoints,
        })
    }
}

/// Client with a complete set of provider endpoints.
///
/// Immutable after construction; safe to share across tasks.
#[derive(Debug, Clone)]
pub struct DiscoveredClient {
    config: ClientConfig,
    http: reqwest::Client,
    endpoints: ProviderEndpoints,
}

impl DiscoveredClient {
    /// Load configuration from `path` (optionally a named section) and run
    /// discovery.
    pub async fn from_file(path: &Path, section: Option<&str>) -> Result<Self> {
        let config = ClientConfig::load(path, section)?;
        OidcClient::new(config).discover().await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }

    pub fn logout_endpoint(&self) -> &str {
        &self.endpoints.end_session_endpoint
    }

    pub fn supported_scopes(&self) -> &[String] {
        &self.endpoints.scopes_supported
    }

    /// Redirect target for the end-user's browser. `response_type` is
    /// usually `"code"`.
    pub fn authorization_url(&self, response_type: &str) -> String {
        build_authorization_url(
            &self.endpoints.authorization_endpoint,
            &self.config.client_id,
            &self.config.redirect_uri,
            &self.config.scopes,
            response_type,
        )
    }

    /// Exchange an authorization code, keeping the failure cause.
    pub async fn try_access_token(
        &self,
        code: &str,
        mode: AuthMode,
    ) -> Result<AccessTokenResponse> {
        token::exchange_code(
            &self.http,
            &self.endpoints.token_endpoint,
            &self.config,
            code,
            mode,
        )
        .await
    }

    /// Exchange an authorization code. Returns `None` on any failure; the
    /// cause is logged.
    pub async fn get_access_token(
        &self,
        code: &str,
        mode: AuthMode,
    ) -> Option<AccessTokenResponse> {
        match self.try_access_token(code, mode).await {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(error = %e, %mode, "token exchange failed");
                None
            }
        }
    }

    /// Fetch the user profile, keeping the failure cause.
    pub async fn try_user_info(&self, token: &AccessTokenResponse) -> Result<ProfileResponse> {
        userinfo::fetch_user_info(&self.http, &self.endpoints.userinfo_endpoint, token).await
    }

    /// Fetch the user profile. Returns `None` on any failure; the cause is
    /// logged.
    pub async fn get_user_info(&self, token: &AccessTokenResponse) -> Option<ProfileResponse> {
        match self.try_user_info(token).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "userinfo fetch failed");
                None
            }
        }
    }
}
