//! Events API HTTP receiver

use crate::bridge::EventDispatcher;
use crate::config::ServerConfig;
use crate::error::{BridgeError, Result};
use crate::slack::{SIGNATURE_HEADER, SignatureVerifier, SlackEvent, TIMESTAMP_HEADER, parse_event};
use axum::{
    Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::Instrument;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<SignatureVerifier>,
    pub dispatcher: Arc<EventDispatcher>,
    pub tasks: DispatchTasks,
}

/// Event dispatches that were acknowledged but may still be running
///
/// Slack does not redeliver an acknowledged event, so shutdown waits on
/// these with [`DispatchTasks::drain`] before the process exits.
#[derive(Clone, Default)]
pub struct DispatchTasks {
    inner: Arc<Mutex<JoinSet<()>>>,
}

impl DispatchTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.inner.lock().await;
        // Reap finished dispatches so the set only holds live ones
        while let Some(finished) = tasks.try_join_next() {
            log_join_failure(finished);
        }
        tasks.spawn(task);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Wait for every dispatch spawned so far to finish
    pub async fn drain(&self) {
        let mut tasks = std::mem::take(&mut *self.inner.lock().await);
        if !tasks.is_empty() {
            tracing::info!(pending = tasks.len(), "Waiting for in-flight event dispatches");
        }
        while let Some(finished) = tasks.join_next().await {
            log_join_failure(finished);
        }
    }
}

fn log_join_failure(result: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        tracing::error!(error = %e, "Event dispatch task failed");
    }
}

pub fn router(state: AppState, events_path: &str) -> Router {
    Router::new()
        .route(events_path, post(handle_events))
        .with_state(state)
}

/// Serve the webhook route until `shutdown` resolves
pub async fn serve(
    config: &ServerConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = router(state, &config.events_path);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        path = %config.events_path,
        "Slack events receiver listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

async fn handle_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("slack_event", request_id = %request_id);

    let body = match body {
        Ok(body) => body,
        Err(e) => {
            let _guard = span.enter();
            tracing::warn!(error = %e, "Unreadable request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let header_value = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let event = {
        let _guard = span.enter();

        if let Err(e) = state
            .verifier
            .verify(
                header_value(TIMESTAMP_HEADER),
                header_value(SIGNATURE_HEADER),
                &body,
            )
        {
            return reject(e);
        }

        match parse_event(&body) {
            Ok(event) => event,
            Err(e) => return reject(e),
        }
    };

    match event {
        SlackEvent::ChallengeRequest { challenge } => {
            span.in_scope(|| tracing::info!("Answering URL verification challenge"));
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain")],
                challenge,
            )
                .into_response()
        }
        SlackEvent::CallbackEvent { event } => {
            span.in_scope(|| tracing::debug!(event_type = event.kind(), "Accepted event callback"));

            // Acknowledge now; Slack expects a response within 3 seconds
            let dispatcher = state.dispatcher.clone();
            state
                .tasks
                .spawn(
                    async move {
                        let outcome = dispatcher.dispatch(event).await;
                        tracing::debug!(outcome = ?outcome, "Event handled");
                    }
                    .instrument(span),
                )
                .await;

            StatusCode::OK.into_response()
        }
    }
}

fn reject(error: BridgeError) -> Response {
    let status = error.status_code();
    tracing::warn!(status = %status, error = %error, "Rejecting Slack request");
    status.into_response()
}
