use std::time::Duration;

use url::Url;

use crate::AuthError;

/// Where the callback server listens, taken apart from the redirect URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalServerConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub timeout: Option<Duration>,
}

impl LocalServerConfig {
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: normalize_path(path.into()),
            timeout: None,
        }
    }

    /// Only plain `http` redirect URIs with a host can be served locally.
    pub fn from_redirect_uri(redirect_uri: &str) -> Result<Self, AuthError> {
        let url = Url::parse(redirect_uri)?;
        if url.scheme() != "http" {
            return Err(AuthError::InvalidRedirectUri(
                "redirect uri must use http scheme".to_string(),
            ));
        }

        let host = url.host_str().ok_or_else(|| {
            AuthError::InvalidRedirectUri("redirect uri is missing host".to_string())
        })?;
        let port = url.port_or_known_default().ok_or_else(|| {
            AuthError::InvalidRedirectUri("redirect uri is missing port".to_string())
        })?;

        // IPv6 hosts come back bracketed; bind wants the bare address.
        let host = host.trim_start_matches('[').trim_end_matches(']');
        Ok(Self::new(host, port, url.path()))
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn normalize_path(path: String) -> String {
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    }
}
