//! Error types for OIDC client operations

/// Errors from discovery, token exchange and userinfo calls.
///
/// Transport failures (`Http`) are kept apart from a provider that answered
/// but refused (`TokenRejected`, `UserInfoRejected`) and from a provider that
/// answered with an unusable body (`MissingAccessToken`, `InvalidResponse`).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("endpoint discovery failed for {url}: {reason}")]
    Discovery { url: String, reason: String },

    #[error("token endpoint returned {status}: {body}")]
    TokenRejected { status: u16, body: String },

    #[error("token response has no access_token")]
    MissingAccessToken,

    #[error("token response has no token_type, cannot build Authorization header")]
    MissingTokenType,

    #[error("userinfo endpoint returned {status}: {body}")]
    UserInfoRejected { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("unknown client authentication mode: {0}")]
    UnknownAuthMode(String),

    #[error(transparent)]
    Config(#[from] common::Error),
}

impl Error {
    /// Short stable label for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Http(_) => "http",
            Error::Discovery { .. } => "discovery",
            Error::TokenRejected { .. } => "token_rejected",
            Error::MissingAccessToken => "missing_access_token",
            Error::MissingTokenType => "missing_token_type",
            Error::UserInfoRejected { .. } => "userinfo_rejected",
            Error::InvalidResponse(_) => "invalid_response",
            Error::UnknownAuthMode(_) => "unknown_auth_mode",
            Error::Config(_) => "config",
        }
    }
}

/// Result alias for OIDC client operations.
pub type Result<T> = std::result::Result<T, Error>;
