//! `WebSocket` handler for real-time job reports.
//!
//! Clients connect to `GET /ws/jobs` and receive a JSON-encoded
//! [`JobBroadcast`](crate::state::JobBroadcast) each time a scheduled job
//! completes. If a client falls behind, lagged messages are skipped and
//! the client resumes from the most recent report.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` and stream job reports.
///
/// # Route
///
/// `GET /ws/jobs`
pub async fn ws_jobs(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("job stream client connected");

    let mut rx = state.subscribe();

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(message) => {
                        let json = match serde_json::to_string(&message) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!(error = %e, "failed to serialize job broadcast");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            debug!("job stream client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "job stream client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("job broadcast channel closed");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => {
                        debug!("job stream client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    // Client text and binary frames are ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
