//! Client configuration loading
//!
//! The configuration file is TOML. Keys live either at the root or inside a
//! named section, so one file can describe several identity providers:
//!
//! ```toml
//! [keycloak]
//! clientId = "my-app"
//! clientSecret = "..."
//! redirectUri = "https://app.example.com/callback"
//! scopes = "openid profile"
//! identityProviderUrl = "https://idp.example.com/realms/main"
//! ```
//!
//! The client secret may be overridden by the OIDC_CLIENT_SECRET env var so
//! it does not have to be stored in the file.

use std::path::{Path, PathBuf};

use common::{Error, Result, Secret};
use serde::Deserialize;

/// Keys that must be present in the selected table.
pub const MANDATORY_KEYS: [&str; 5] = [
    "clientId",
    "clientSecret",
    "redirectUri",
    "scopes",
    "identityProviderUrl",
];

/// Env var overriding `clientSecret`.
pub const CLIENT_SECRET_ENV: &str = "OIDC_CLIENT_SECRET";

/// Static relying-party configuration, immutable once loaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub redirect_uri: String,
    /// Space-delimited scope string, sent as-is
    pub scopes: String,
    /// Provider base URL; `.well-known` is resolved against it
    pub identity_provider_url: String,
}

impl ClientConfig {
    /// Load configuration from a TOML file, then overlay OIDC_CLIENT_SECRET.
    pub fn load(path: &Path, section: Option<&str>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let secret_override = std::env::var(CLIENT_SECRET_ENV).ok();
        Self::parse(&contents, section, secret_override)
    }

    /// Parse configuration from TOML text without consulting the environment.
    pub fn from_toml_str(contents: &str, section: Option<&str>) -> Result<Self> {
        Self::parse(contents, section, None)
    }

    fn parse(
        contents: &str,
        section: Option<&str>,
        secret_override: Option<String>,
    ) -> Result<Self> {
        let mut root: toml::Table = toml::from_str(contents)?;

        let mut table = match section {
            None => root,
            Some(name) => match root.remove(name) {
                Some(toml::Value::Table(table)) => table,
                Some(_) => {
                    return Err(Error::Config(format!("[{name}] must be a table")));
                }
                None => return Err(Error::MissingSection(name.to_owned())),
            },
        };

        if let Some(secret) = secret_override {
            table.insert("clientSecret".into(), toml::Value::String(secret));
        }

        let missing: Vec<String> = MANDATORY_KEYS
            .iter()
            .filter(|key| !table.contains_key(**key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingKeys(missing));
        }

        let config: ClientConfig = toml::Value::Table(table).try_into()?;

        if !config.identity_provider_url.starts_with("http://")
            && !config.identity_provider_url.starts_with("https://")
        {
            return Err(Error::Config(format!(
                "identityProviderUrl must start with http:// or https://, got: {}",
                config.identity_provider_url
            )));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("oidc-client.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that mutate environment variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn root_toml() -> &'static str {
        r#"
clientId = "abc"
clientSecret = "file-secret"
redirectUri = "https://app/cb"
scopes = "openid profile"
identityProviderUrl = "https://idp.example.com"
"#
    }

    fn sectioned_toml() -> &'static str {
        r#"
[cas]
clientId = "cas-client"
clientSecret = "cas-secret"
redirectUri = "https://app/cas/cb"
scopes = "openid email"
identityProviderUrl = "https://cas.example.com/oidc/"

[incomplete]
clientId = "x"
scopes = "openid"
"#
    }

    #[test]
    fn parses_root_keys() {
        let config = ClientConfig::from_toml_str(root_toml(), None).unwrap();
        assert_eq!(config.client_id, "abc");
        assert_eq!(config.client_secret.expose(), "file-secret");
        assert_eq!(config.redirect_uri, "https://app/cb");
        assert_eq!(config.scopes, "openid profile");
        assert_eq!(config.identity_provider_url, "https://idp.example.com");
    }

    #[test]
    fn parses_named_section() {
        let config = ClientConfig::from_toml_str(sectioned_toml(), Some("cas")).unwrap();
        assert_eq!(config.client_id, "cas-client");
        assert_eq!(config.identity_provider_url, "https://cas.example.com/oidc/");
    }

    #[test]
    fn missing_section_is_reported() {
        let err = ClientConfig::from_toml_str(sectioned_toml(), Some("nope")).unwrap_err();
        assert!(matches!(err, Error::MissingSection(ref s) if s == "nope"), "got: {err}");
    }

    #[test]
    fn non_table_section_is_rejected() {
        let err = ClientConfig::from_toml_str(root_toml(), Some("clientId")).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got: {err}");
    }

    #[test]
    fn all_missing_keys_are_listed() {
        let err = ClientConfig::from_toml_str(sectioned_toml(), Some("incomplete")).unwrap_err();
        match err {
            Error::MissingKeys(keys) => {
                assert_eq!(keys, vec!["clientSecret", "redirectUri", "identityProviderUrl"]);
            }
            other => panic!("expected MissingKeys, got: {other}"),
        }
    }

    #[test]
    fn root_lookup_ignores_sections() {
        // Keys only present under [cas] do not satisfy a root lookup
        let err = ClientConfig::from_toml_str(sectioned_toml(), None).unwrap_err();
        assert!(matches!(err, Error::MissingKeys(ref keys) if keys.len() == 5));
    }

    #[test]
    fn provider_url_without_scheme_is_rejected() {
        let toml_content = root_toml().replace("https://idp.example.com", "idp.example.com");
        let err = ClientConfig::from_toml_str(&toml_content, None).unwrap_err();
        let msg = err.to_string();
        assert!(
            msg.contains("identityProviderUrl must start with http"),
            "error message should explain the issue, got: {msg}"
        );
    }

    #[test]
    fn wrong_value_type_is_a_toml_error() {
        let toml_content = root_toml().replace(r#"scopes = "openid profile""#, "scopes = 42");
        let err = ClientConfig::from_toml_str(&toml_content, None).unwrap_err();
        assert!(matches!(err, Error::Toml(_)), "got: {err}");
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = ClientConfig::from_toml_str(root_toml(), None).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("file-secret"), "secret leaked: {debug}");
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn load_reads_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env(CLIENT_SECRET_ENV) };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oidc.toml");
        std::fs::write(&path, sectioned_toml()).unwrap();

        let config = ClientConfig::load(&path, Some("cas")).unwrap();
        assert_eq!(config.client_secret.expose(), "cas-secret");
    }

    #[test]
    fn load_missing_file() {
        let result = ClientConfig::load(Path::new("/nonexistent/path/oidc.toml"), None);
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn secret_env_overrides_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oidc.toml");
        std::fs::write(&path, root_toml()).unwrap();

        unsafe { set_env(CLIENT_SECRET_ENV, "env-secret") };
        let config = ClientConfig::load(&path, None);
        unsafe { remove_env(CLIENT_SECRET_ENV) };

        assert_eq!(config.unwrap().client_secret.expose(), "env-secret");
    }

    #[test]
    fn secret_env_satisfies_mandatory_key() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oidc.toml");
        std::fs::write(&path, root_toml().replace(r#"clientSecret = "file-secret""#, "")).unwrap();

        unsafe { set_env(CLIENT_SECRET_ENV, "env-only") };
        let config = ClientConfig::load(&path, None);
        unsafe { remove_env(CLIENT_SECRET_ENV) };

        assert_eq!(config.unwrap().client_secret.expose(), "env-only");
    }

    #[test]
    fn test_resolve_path_cli_arg() {
        let path = ClientConfig::resolve_path(Some("/custom/path.toml"));
        assert_eq!(path, PathBuf::from("/custom/path.toml"));
    }

    #[test]
    fn test_resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/path.toml") };
        let path = ClientConfig::resolve_path(None);
        unsafe { remove_env("CONFIG_PATH") };
        assert_eq!(path, PathBuf::from("/env/path.toml"));
    }

    #[test]
    fn test_resolve_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        let path = ClientConfig::resolve_path(None);
        assert_eq!(path, PathBuf::from("oidc-client.toml"));
    }
}
