use reqwest::{Client, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{AuthError, Credentials, Endpoints, TokenResponse, UserInfo};

/// HTTP side of the flow: the token exchange and the userinfo lookup.
#[derive(Debug, Clone)]
pub struct LinkedInClient {
    credentials: Credentials,
    endpoints: Endpoints,
    redirect_uri: String,
    http: Client,
}

impl LinkedInClient {
    pub fn new(
        credentials: Credentials,
        endpoints: Endpoints,
        redirect_uri: impl Into<String>,
        timeout: Option<std::time::Duration>,
    ) -> Result<Self, AuthError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self::with_http_client(
            credentials,
            endpoints,
            redirect_uri,
            http,
        ))
    }

    pub fn with_http_client(
        credentials: Credentials,
        endpoints: Endpoints,
        redirect_uri: impl Into<String>,
        http: Client,
    ) -> Self {
        Self {
            credentials,
            endpoints,
            redirect_uri: redirect_uri.into(),
            http,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Trades an authorization code for an access token. Any non-200 answer is
    /// returned as [`AuthError::HttpStatus`]; nothing is retried.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        let payload = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];

        debug!(url = %self.endpoints.token_url, "exchanging authorization code");
        let response = self
            .http
            .post(&self.endpoints.token_url)
            .header(header::ACCEPT, "application/json")
            .form(&payload)
            .send()
            .await?;

        let token: TokenResponse = read_json(response).await?;
        match token.expires_in {
            Some(seconds) => info!(expires_in = seconds, "access token obtained"),
            None => info!("access token obtained"),
        }
        Ok(token)
    }

    pub async fn fetch_userinfo(&self, access_token: &str) -> Result<UserInfo, AuthError> {
        debug!(url = %self.endpoints.userinfo_url, "fetching user info");
        let response = self
            .http
            .get(&self.endpoints.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let user: UserInfo = read_json(response).await?;
        info!(user = user.display_name(), "signed in");
        Ok(user)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
    let status = response.status();
    let body = response.text().await?;

    if status != StatusCode::OK {
        return Err(AuthError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|err| AuthError::InvalidResponse {
        message: err.to_string(),
        body,
    })
}
