#![allow(dead_code)]

use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;

use linkedin_auth::{AuthSettings, Authenticator, Credentials, Endpoints, LinkedInClient};
use wiremock::MockServer;

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";

/// Reserves a loopback port and releases it for the callback server.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Client that never routes loopback traffic through an environment proxy.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn settings(mock: &MockServer, token_file: &Path) -> AuthSettings {
    AuthSettings::default()
        .with_endpoints(Endpoints {
            authorize_url: format!("{}/oauth/v2/authorization", mock.uri()),
            token_url: format!("{}/oauth/v2/accessToken", mock.uri()),
            userinfo_url: format!("{}/v2/userinfo", mock.uri()),
        })
        .with_redirect_uri(format!("http://127.0.0.1:{}/callback", free_port()))
        .with_token_file(token_file)
        .with_callback_timeout(Duration::from_secs(10))
}

pub fn authenticator(settings: AuthSettings) -> Authenticator {
    let client = LinkedInClient::with_http_client(
        Credentials::new(CLIENT_ID, CLIENT_SECRET),
        settings.endpoints.clone(),
        settings.redirect_uri.clone(),
        http_client(),
    );
    Authenticator::with_client(client, settings)
}

/// Plays the browser: follows the redirect to the callback with `query`.
pub fn redirect_later(redirect_uri: &str, query: String) {
    let url = format!("{redirect_uri}?{query}");
    tokio::spawn(async move {
        let _ = http_client().get(url).send().await;
    });
}
