use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::{
    AuthError, AuthSettings, Authenticated, AuthorizationResponse, Credentials, LinkedInClient,
    LocalServer, LocalServerConfig, TokenCache, TokenRecord, authorization_url, person_urn,
};

/// The URL the user must visit, handed to the `on_authorize` hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub authorization_url: String,
    pub redirect_uri: String,
    pub state: String,
}

/// Drives one authorization: reuse the cached token if the provider still
/// accepts it, otherwise run the browser flow and write a new record.
#[derive(Debug, Clone)]
pub struct Authenticator {
    client: LinkedInClient,
    cache: TokenCache,
    settings: AuthSettings,
}

impl Authenticator {
    pub fn new(credentials: Credentials, settings: AuthSettings) -> Result<Self, AuthError> {
        let client = LinkedInClient::new(
            credentials,
            settings.endpoints.clone(),
            settings.redirect_uri.clone(),
            settings.http_timeout,
        )?;
        Ok(Self::with_client(client, settings))
    }

    /// Reads the credentials through `lookup` before anything else is built,
    /// so a missing variable fails without touching the network.
    pub fn from_lookup<F>(lookup: F, settings: AuthSettings) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(lookup)?;
        Self::new(credentials, settings)
    }

    pub fn with_client(client: LinkedInClient, settings: AuthSettings) -> Self {
        Self {
            cache: TokenCache::new(settings.token_file.clone()),
            client,
            settings,
        }
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    pub fn authorization_request(&self) -> Result<AuthorizationRequest, AuthError> {
        let url = authorization_url(
            &self.settings.endpoints.authorize_url,
            &self.client.credentials().client_id,
            &self.settings.redirect_uri,
            &self.settings.scope,
            &self.settings.state,
        )?;
        Ok(AuthorizationRequest {
            authorization_url: url,
            redirect_uri: self.settings.redirect_uri.clone(),
            state: self.settings.state.clone(),
        })
    }

    /// Returns a working access token and the member URN.
    ///
    /// A cached record is probed with a userinfo call first. If the probe
    /// fails for any reason the full flow runs and the record is replaced.
    pub async fn authenticate<F>(&self, on_authorize: F) -> Result<Authenticated, AuthError>
    where
        F: FnOnce(&AuthorizationRequest) -> Result<(), AuthError>,
    {
        if let Some(authenticated) = self.try_cached().await {
            return Ok(authenticated);
        }
        self.authorize(on_authorize).await
    }

    async fn try_cached(&self) -> Option<Authenticated> {
        let record = match self.cache.load() {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable token file");
                return None;
            }
        };

        info!(path = %self.cache.path().display(), "found existing tokens, probing");
        match self.client.fetch_userinfo(&record.access_token).await {
            Ok(user) => Some(Authenticated {
                access_token: record.access_token,
                person_urn: person_urn(&user.sub),
                user_name: user.display_name().to_string(),
                reused: true,
            }),
            Err(err) => {
                warn!(error = %err, "existing token rejected, re-authorizing");
                None
            }
        }
    }

    /// Runs the browser flow unconditionally and overwrites the token file.
    pub async fn authorize<F>(&self, on_authorize: F) -> Result<Authenticated, AuthError>
    where
        F: FnOnce(&AuthorizationRequest) -> Result<(), AuthError>,
    {
        let request = self.authorization_request()?;
        let code = self.wait_for_code(&request, on_authorize).await?;

        let token = self.client.exchange_code(&code).await?;
        let user = self.client.fetch_userinfo(&token.access_token).await?;

        let record = TokenRecord::new(token, &user);
        self.cache.save(&record)?;

        Ok(Authenticated {
            access_token: record.access_token,
            person_urn: record.person_urn,
            user_name: record.user_name,
            reused: false,
        })
    }

    async fn wait_for_code<F>(
        &self,
        request: &AuthorizationRequest,
        on_authorize: F,
    ) -> Result<String, AuthError>
    where
        F: FnOnce(&AuthorizationRequest) -> Result<(), AuthError>,
    {
        let config = LocalServerConfig::from_redirect_uri(&request.redirect_uri)?
            .with_timeout(self.settings.callback_timeout);
        let server = LocalServer::from_config(config);
        // Bind before the browser opens so an instant redirect cannot miss us.
        let listener = server.bind()?;

        // Dropping `cancel_tx` also stops the server, so it lives until the
        // handle has been awaited.
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            server
                .listen_until(listener, async move {
                    let _ = cancel_rx.await;
                })
                .await
        });

        if let Err(err) = on_authorize(request) {
            let _ = cancel_tx.send(());
            let _ = handle.await;
            return Err(err);
        }
        info!("waiting for authorization callback");

        let response: AuthorizationResponse =
            handle.await.map_err(|err| AuthError::InvalidResponse {
                message: err.to_string(),
                body: String::new(),
            })??;
        drop(cancel_tx);
        response.verify_state(&request.state)?;

        info!("authorization code received");
        Ok(response.code)
    }
}
