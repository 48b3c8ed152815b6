use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::AuthError;

const PERSON_URN_PREFIX: &str = "urn:li:person:";
const UNKNOWN_USER_NAME: &str = "Unknown";

/// What the provider sent back to the redirect URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub code: String,
    pub state: Option<String>,
}

impl AuthorizationResponse {
    /// Interprets a raw callback query string.
    ///
    /// A non-empty `code` wins. Otherwise a non-empty `error` parameter becomes
    /// [`AuthError::Callback`], and a query carrying neither is
    /// [`AuthError::MissingAuthorizationCode`].
    pub fn from_query(query: &str) -> Result<Self, AuthError> {
        let mut code = None;
        let mut state = None;
        let mut error = None;
        let mut description = None;

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "code" if code.is_none() => code = Some(value.into_owned()),
                "state" if state.is_none() => state = Some(value.into_owned()),
                "error" if error.is_none() => error = Some(value.into_owned()),
                "error_description" if description.is_none() => {
                    description = Some(value.into_owned())
                }
                _ => {}
            }
        }

        let code = code.filter(|code| !code.is_empty());
        let error = error.filter(|error| !error.is_empty());
        match (code, error) {
            (Some(code), _) => Ok(Self { code, state }),
            (None, Some(error)) => Err(AuthError::Callback { error, description }),
            (None, None) => Err(AuthError::MissingAuthorizationCode),
        }
    }

    pub fn verify_state(&self, expected: &str) -> Result<(), AuthError> {
        match self.state.as_deref() {
            Some(received) if received != expected => Err(AuthError::StateMismatch {
                expected: expected.to_string(),
                received: received.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Body of a successful `accessToken` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<u64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// OpenID userinfo claims. Only `sub` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl UserInfo {
    pub fn person_urn(&self) -> String {
        person_urn(&self.sub)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_USER_NAME)
    }
}

pub fn person_urn(sub: &str) -> String {
    format!("{PERSON_URN_PREFIX}{sub}")
}

/// The record kept in the token file.
///
/// Fields the token endpoint returned beyond the ones named here are kept in
/// `extra` so that rewriting the file does not drop them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub person_urn: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl TokenRecord {
    pub fn new(token: TokenResponse, user: &UserInfo) -> Self {
        Self {
            access_token: token.access_token,
            expires_in: token.expires_in.unwrap_or_default(),
            person_urn: user.person_urn(),
            user_name: user.display_name().to_string(),
            extra: token.extra,
        }
    }
}

/// Outcome of [`crate::Authenticator::authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub access_token: String,
    pub person_urn: String,
    pub user_name: String,
    /// True when the cached token passed the probe and no new authorization ran.
    pub reused: bool,
}
