//! Provider endpoint discovery via the `.well-known` document
//!
//! A single GET, no retries. The document must answer 200 and carry every
//! endpoint this client uses; a partially usable document is a failure, so a
//! `ProviderEndpoints` value is always complete.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Endpoints and scopes advertised by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderEndpoints {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub end_session_endpoint: String,
    pub scopes_supported: Vec<String>,
}

/// Discovery document URL for a provider base URL.
///
/// Exactly one `/` separates the provider from `.well-known`.
pub fn well_known_url(provider: &str) -> String {
    if provider.ends_with('/') {
        format!("{provider}.well-known")
    } else {
        format!("{provider}/.well-known")
    }
}

/// Fetch and validate the provider's discovery document.
pub async fn discover(client: &reqwest::Client, provider: &str) -> Result<ProviderEndpoints> {
    let url = well_known_url(provider);
    debug!(url = %url, "fetching discovery document");

    let response = client
        .get(&url)
        .header(ACCEPT, "application/json")
        .header(CACHE_CONTROL, "no-cache")
        .send()
        .await
        .map_err(|e| Error::Http(format!("discovery request to {url} failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Http(format!("reading discovery response from {url}: {e}")))?;

    if status != StatusCode::OK {
        return Err(Error::Discovery {
            url,
            reason: format!("status {status}: {body}"),
        });
    }

    parse_document(&url, &body)
}

fn parse_document(url: &str, body: &str) -> Result<ProviderEndpoints> {
    let failure = |reason: String| Error::Discovery {
        url: url.to_owned(),
        reason,
    };

    let document: serde_json::Value =
        serde_json::from_str(body).map_err(|e| failure(format!("invalid JSON: {e}")))?;

    if document.get("authorization_endpoint").is_none() {
        return Err(failure(format!(
            "can't retrieve authorization_endpoint key, response was {body}"
        )));
    }

    serde_json::from_value(document)
        .map_err(|e| failure(format!("incomplete discovery document: {e}")))
}
