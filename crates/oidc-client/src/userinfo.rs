//! Userinfo endpoint

use std::collections::BTreeMap;

use reqwest::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::token::AccessTokenResponse;

/// Authenticated user profile returned by the userinfo endpoint.
///
/// Every field is required; a body missing any of them is rejected.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProfileResponse {
    /// Subject identifier
    pub sub: String,
    /// Service the profile was released to
    pub service: String,
    /// Authentication time, unix seconds
    pub auth_time: i64,
    /// Released user attributes
    pub attributes: BTreeMap<String, serde_json::Value>,
    pub id: String,
    /// Client the profile was issued for
    pub client_id: String,
}

/// Fetch the profile for an access token.
///
/// The `Authorization` header is `<token_type> <access_token>` taken verbatim
/// from the token response. A token without `token_type` fails before any
/// request is sent.
pub async fn fetch_user_info(
    client: &reqwest::Client,
    endpoint: &str,
    token: &AccessTokenResponse,
) -> Result<ProfileResponse> {
    let authorization = token.authorization_header()?;
    debug!(endpoint, "fetching user profile");

    let response = client
        .get(endpoint)
        .header(ACCEPT, "application/json")
        .header(CACHE_CONTROL, "no-cache")
        .header(AUTHORIZATION, authorization)
        .send()
        .await
        .map_err(|e| Error::Http(format!("userinfo request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Http(format!("reading userinfo response: {e}")))?;

    if !status.is_success() {
        return Err(Error::UserInfoRejected {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| Error::InvalidResponse(format!("invalid userinfo response: {e}")))
}
