use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use aidlink_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::authenticate;
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// `GET /api/v1/ws?token=<access token>`
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Optional; without it the socket is anonymous.
    pub token: Option<String>,
}

/// Upgrade to a WebSocket. A supplied token must be valid; the check runs
/// before the upgrade so a bad token gets a plain 401.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
) -> AppResult<Response> {
    let user_id = match params.token.as_deref() {
        Some(token) => Some(authenticate(token, &state)?.user_id),
        None => None,
    };
    let ws_manager = Arc::clone(&state.ws_manager);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, ws_manager, user_id)))
}

async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>, user_id: Option<DbId>) {
    let conn_id = Uuid::new_v4();
    tracing::info!(conn_id = %conn_id, ?user_id, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id, user_id).await;
    let (mut sink, mut stream) = socket.split();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    // The feed is server-to-client; inbound frames only matter for close
    // and liveness.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => tracing::trace!(conn_id = %conn_id, "Pong received"),
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
