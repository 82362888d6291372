//! Configuration error types

use thiserror::Error;

/// Errors raised while loading client configuration
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration section [{0}] not found")]
    MissingSection(String),

    #[error("Missing mandatory configuration keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using common Error
pub type Result<T> = std::result::Result<T, Error>;
