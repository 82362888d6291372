//! OpenID Connect relying-party client
//!
//! Discovers an identity provider's endpoints, builds authorization-code
//! flow URLs, exchanges codes for tokens and fetches the user profile.
//! The HTTP transport is `reqwest`; configuration comes from a TOML file.
//!
//! Flow:
//! 1. Load `config::ClientConfig` (optionally from a named section)
//! 2. `OidcClient::discover()` fetches `<provider>/.well-known` and yields a
//!    `DiscoveredClient` (or use `DiscoveredClient::from_file()` for both steps)
//! 3. Redirect the browser to `DiscoveredClient::authorization_url("code")`
//! 4. On callback, `DiscoveredClient::get_access_token()` with the code
//! 5. `DiscoveredClient::get_user_info()` with the returned token
//!
//! The `get_*` methods return `None` on failure and log the cause. The
//! `try_*` variants return the structured `Error` instead.

pub mod authorize;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod token;
pub mod userinfo;

#[cfg(test)]
mod testing;

pub use authorize::build_authorization_url;
pub use client::{DiscoveredClient, OidcClient};
pub use config::ClientConfig;
pub use discovery::{ProviderEndpoints, discover, well_known_url};
pub use error::{Error, Result};
pub use token::{AccessTokenResponse, AuthMode, exchange_code};
pub use userinfo::{ProfileResponse, fetch_user_info};
