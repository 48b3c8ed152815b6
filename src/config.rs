use std::path::PathBuf;
use std::time::Duration;

use crate::AuthError;

pub const CLIENT_ID_VAR: &str = "LINKEDIN_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "LINKEDIN_CLIENT_SECRET";

const AUTHORIZE_URL: &str = "https://www.linkedin.com/oauth/v2/authorization";
const TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";
const USERINFO_URL: &str = "https://api.linkedin.com/v2/userinfo";

const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/callback";
const DEFAULT_SCOPE: &str = "openid profile w_member_social";
const DEFAULT_STATE: &str = "linkedin_post_state";
const DEFAULT_TOKEN_FILE: &str = "linkedin_tokens.json";
const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// App credentials issued by the LinkedIn developer portal. Never persisted.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves both credentials through `lookup`, reporting every missing name at once.
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let client_id = read(CLIENT_ID_VAR);
        let client_secret = read(CLIENT_SECRET_VAR);

        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Self::new(client_id, client_secret)),
            (client_id, client_secret) => {
                let mut names = Vec::new();
                if client_id.is_none() {
                    names.push(CLIENT_ID_VAR);
                }
                if client_secret.is_none() {
                    names.push(CLIENT_SECRET_VAR);
                }
                Err(AuthError::MissingConfig { names })
            }
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Provider endpoints. Overridable so tests can point the client at a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            userinfo_url: USERINFO_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub endpoints: Endpoints,
    pub redirect_uri: String,
    pub scope: String,
    pub state: String,
    pub token_file: PathBuf,
    pub callback_timeout: Duration,
    pub http_timeout: Option<Duration>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            state: DEFAULT_STATE.to_string(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            callback_timeout: DEFAULT_CALLBACK_TIMEOUT,
            http_timeout: None,
        }
    }
}

impl AuthSettings {
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    pub fn with_token_file(mut self, token_file: impl Into<PathBuf>) -> Self {
        self.token_file = token_file.into();
        self
    }

    pub fn with_callback_timeout(mut self, timeout: Duration) -> Self {
        self.callback_timeout = timeout;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn reads_both_credentials() {
        let creds = Credentials::from_lookup(lookup_from(&[
            (CLIENT_ID_VAR, "id-123"),
            (CLIENT_SECRET_VAR, "secret-456"),
        ]))
        .unwrap();
        assert_eq!(creds.client_id, "id-123");
        assert_eq!(creds.client_secret, "secret-456");
    }

    #[test]
    fn reports_every_missing_variable() {
        let err = Credentials::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.is_configuration());
        match err {
            AuthError::MissingConfig { names } => {
                assert_eq!(names, vec![CLIENT_ID_VAR, CLIENT_SECRET_VAR]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let err = Credentials::from_lookup(lookup_from(&[
            (CLIENT_ID_VAR, "id-123"),
            (CLIENT_SECRET_VAR, "   "),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            AuthError::MissingConfig { ref names } if names == &vec![CLIENT_SECRET_VAR]
        ));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let creds = Credentials::new("id-123", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("id-123"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn defaults_target_linkedin() {
        let settings = AuthSettings::default();
        assert_eq!(settings.redirect_uri, "http://localhost:8000/callback");
        assert_eq!(settings.scope, "openid profile w_member_social");
        assert_eq!(settings.state, "linkedin_post_state");
        assert_eq!(settings.token_file, PathBuf::from("linkedin_tokens.json"));
        assert_eq!(settings.callback_timeout, Duration::from_secs(120));
        assert_eq!(
            settings.endpoints.token_url,
            "https://www.linkedin.com/oauth/v2/accessToken"
        );
    }
}
