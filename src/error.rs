//! Error types for keyforge.

use thiserror::Error;

/// Primary error type for all keyforge operations.
#[derive(Error, Debug)]
pub enum KeyforgeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Not authenticated: no token set held")]
    NotAuthenticated,

    #[error("{resource} '{name}' not found in realm '{realm}'")]
    NotFound {
        resource: &'static str,
        name: String,
        realm: String,
    },

    #[error("Request failed (status {status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Credential cache unavailable: {0}")]
    Cache(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, KeyforgeError>;
