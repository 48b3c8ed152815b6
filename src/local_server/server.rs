use std::future::Future;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::{Router, routing::get};
use tokio::net::TcpListener as TokioTcpListener;
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use tracing::debug;

use crate::{AuthError, AuthorizationResponse};

use super::config::LocalServerConfig;
use super::http::{
    LocalServerState, callback_handler, fallback_handler, send_response, wait_for_response,
};

#[derive(Debug, Clone)]
pub struct LocalServer {
    config: LocalServerConfig,
}

impl LocalServer {
    pub fn new(redirect_uri: impl Into<String>) -> Result<Self, AuthError> {
        let redirect_uri = redirect_uri.into();
        Ok(Self::from_config(LocalServerConfig::from_redirect_uri(
            &redirect_uri,
        )?))
    }

    pub fn from_config(config: LocalServerConfig) -> Self {
        Self { config }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn bind(&self) -> Result<TcpListener, AuthError> {
        TcpListener::bind((self.config.host.as_str(), self.config.port)).map_err(AuthError::from)
    }

    /// Blocking wrapper around [`Self::listen_with_async`] that runs the
    /// server on its own thread and runtime.
    pub fn listen_with(&self, listener: TcpListener) -> Result<AuthorizationResponse, AuthError> {
        let server = self.clone();
        let handle = thread::spawn(move || -> Result<AuthorizationResponse, AuthError> {
            let runtime = Builder::new_current_thread().enable_all().build()?;
            runtime.block_on(server.listen_with_async(listener))
        });

        match handle.join() {
            Ok(result) => result,
            Err(_) => Err(AuthError::InvalidResponse {
                message: "local server thread panicked".to_string(),
                body: String::new(),
            }),
        }
    }

    pub async fn listen_with_async(
        &self,
        listener: TcpListener,
    ) -> Result<AuthorizationResponse, AuthError> {
        self.listen_until(listener, std::future::pending()).await
    }

    /// Serves until the first redirect carrying `code` or `error` arrives,
    /// the timeout expires, or `cancel` resolves. In every case the server
    /// has stopped and the listener is closed when this returns.
    pub async fn listen_until<C>(
        &self,
        listener: TcpListener,
        cancel: C,
    ) -> Result<AuthorizationResponse, AuthError>
    where
        C: Future<Output = ()> + Send,
    {
        let (response_tx, response_rx) =
            oneshot::channel::<Result<AuthorizationResponse, AuthError>>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let response_tx = Arc::new(Mutex::new(Some(response_tx)));

        let state = LocalServerState {
            response_tx: response_tx.clone(),
        };

        let app = Router::new()
            .route(&self.config.path, get(callback_handler))
            .fallback(fallback_handler)
            .with_state(state);

        listener.set_nonblocking(true)?;
        let listener = TokioTcpListener::from_std(listener)?;
        debug!(addr = ?listener.local_addr().ok(), path = %self.config.path, "waiting for callback");

        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });

        let response_tx_for_server = response_tx.clone();
        let server_handle = tokio::spawn(async move {
            if let Err(err) = server.await {
                let error = AuthError::InvalidResponse {
                    message: err.to_string(),
                    body: String::new(),
                };
                send_response(&response_tx_for_server, Err(error));
            }
        });

        let response = tokio::select! {
            response = wait_for_response(response_rx, self.config.timeout) => response,
            () = cancel => {
                debug!("callback wait cancelled");
                Err(AuthError::LocalServerCancelled)
            }
        };

        let _ = shutdown_tx.send(());
        let _ = server_handle.await;

        response
    }
}
