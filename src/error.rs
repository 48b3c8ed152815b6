use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("missing configuration: {}", names.join(", "))]
    MissingConfig { names: Vec<&'static str> },

    #[error("invalid redirect uri: {0}")]
    InvalidRedirectUri(String),

    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("invalid response: {message}")]
    InvalidResponse { message: String, body: String },

    #[error("missing authorization code in callback url")]
    MissingAuthorizationCode,

    #[error("authorization denied by provider: {error}")]
    Callback {
        error: String,
        description: Option<String>,
    },

    #[error("state mismatch (expected={expected}, received={received})")]
    StateMismatch { expected: String, received: String },

    #[error("token cache {}: {message}", path.display())]
    Cache { path: PathBuf, message: String },

    #[cfg(feature = "local-server")]
    #[error("local server timed out after {timeout:?}")]
    LocalServerTimeout { timeout: std::time::Duration },

    #[cfg(feature = "local-server")]
    #[error("local server stopped before a callback arrived")]
    LocalServerCancelled,
}

impl AuthError {
    /// Errors raised before any network activity because the app credentials are absent.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingConfig { .. })
    }

    /// The provider answered, but not with a success status.
    pub fn is_provider_rejection(&self) -> bool {
        matches!(self, Self::HttpStatus { .. })
    }
}
