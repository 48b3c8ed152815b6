use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{OriginalUri, RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tokio::sync::oneshot;
use tracing::debug;

use crate::{AuthError, AuthorizationResponse};

use super::pages::{ErrorPage, SuccessPage, render};

const UNKNOWN_ERROR: &str = "Unknown error";

type ResponseResult = Result<AuthorizationResponse, AuthError>;
type ResponseSender = oneshot::Sender<ResponseResult>;
type ResponseReceiver = oneshot::Receiver<ResponseResult>;
type SharedResponseSender = Arc<Mutex<Option<ResponseSender>>>;

#[derive(Clone)]
pub(super) struct LocalServerState {
    pub(super) response_tx: SharedResponseSender,
}

/// Delivers the first outcome; later ones are dropped.
pub(super) fn send_response(response_tx: &SharedResponseSender, response: ResponseResult) {
    if let Ok(mut guard) = response_tx.lock() {
        if let Some(sender) = guard.take() {
            let _ = sender.send(response);
        }
    }
}

pub(super) async fn callback_handler(
    State(state): State<LocalServerState>,
    RawQuery(query): RawQuery,
) -> (StatusCode, Html<String>) {
    match AuthorizationResponse::from_query(query.as_deref().unwrap_or_default()) {
        Ok(response) => {
            debug!("callback carried an authorization code");
            send_response(&state.response_tx, Ok(response));
            (StatusCode::OK, render(&SuccessPage))
        }
        Err(AuthError::Callback { error, description }) => {
            debug!(%error, "callback carried an error");
            let page = render(&ErrorPage { error: &error });
            send_response(
                &state.response_tx,
                Err(AuthError::Callback { error, description }),
            );
            (StatusCode::BAD_REQUEST, page)
        }
        // Neither code nor error: answer 400 and keep waiting.
        Err(_) => {
            debug!("callback carried neither code nor error");
            (
                StatusCode::BAD_REQUEST,
                render(&ErrorPage {
                    error: UNKNOWN_ERROR,
                }),
            )
        }
    }
}

pub(super) async fn fallback_handler(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    debug!(path = uri.path(), "ignoring request outside the callback path");
    StatusCode::NOT_FOUND
}

pub(super) async fn wait_for_response(
    response_rx: ResponseReceiver,
    timeout: Option<Duration>,
) -> Result<AuthorizationResponse, AuthError> {
    let closed = |_: oneshot::error::RecvError| AuthError::InvalidResponse {
        message: "local server response channel closed".to_string(),
        body: String::new(),
    };

    if let Some(timeout) = timeout {
        let result = tokio::time::timeout(timeout, response_rx)
            .await
            .map_err(|_| AuthError::LocalServerTimeout { timeout })?;
        result.map_err(closed)?
    } else {
        response_rx.await.map_err(closed)?
    }
}
