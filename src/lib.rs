//! One-shot LinkedIn OAuth 2.0 authorization.
//!
//! Captures the authorization code on a loopback redirect, exchanges it for an
//! access token with the app's client secret, resolves the member URN through
//! the OpenID userinfo endpoint and keeps the result in a local token file.

mod authorize;
mod cache;
mod client;
mod config;
mod error;
#[cfg(feature = "local-server")]
mod flow;
#[cfg(feature = "local-server")]
mod local_server;
mod types;

pub use authorize::authorization_url;
pub use cache::TokenCache;
pub use client::LinkedInClient;
pub use config::{AuthSettings, CLIENT_ID_VAR, CLIENT_SECRET_VAR, Credentials, Endpoints};
pub use error::AuthError;
#[cfg(feature = "local-server")]
pub use flow::{AuthorizationRequest, Authenticator};
#[cfg(feature = "local-server")]
pub use local_server::{LocalServer, LocalServerConfig};
pub use types::{
    Authenticated, AuthorizationResponse, TokenRecord, TokenResponse, UserInfo, person_urn,
};
