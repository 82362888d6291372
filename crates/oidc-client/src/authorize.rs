//! Authorization URL construction
//!
//! Pure string building, no I/O. Parameter values are form-encoded
//! (`application/x-www-form-urlencoded`), so spaces in the scope string
//! become `+` and reserved characters are percent-encoded.

use url::form_urlencoded;

/// Build the authorization-code flow redirect URL.
///
/// Produces `<endpoint>?client_id=..&redirect_uri=..&response_type=..&scope=..`.
/// The same inputs always produce the same URL.
pub fn build_authorization_url(
    endpoint: &str,
    client_id: &str,
    redirect_uri: &str,
    scopes: &str,
    response_type: &str,
) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", response_type)
        .append_pair("scope", scopes)
        .finish();
    format!("{endpoint}?{query}")
}
