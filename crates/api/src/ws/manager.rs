use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use aidlink_core::types::{DbId, Timestamp};

pub type WsSender = mpsc::UnboundedSender<Message>;

/// One open socket.
pub struct WsConnection {
    /// `None` for anonymous sockets, which only receive change events.
    pub user_id: Option<DbId>,
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

/// Registry of open WebSocket connections, keyed by a per-connection UUID.
///
/// Sends never block: each connection drains its own unbounded channel in
/// a dedicated task. A closed channel is skipped and cleaned up when that
/// connection's receive loop ends.
#[derive(Default)]
pub struct WsManager {
    connections: RwLock<HashMap<Uuid, WsConnection>>,
}

/// Wire frame: `{ "type": ..., "data": ... }`.
#[derive(Serialize)]
struct Frame<'a, T: Serialize> {
    #[serde(rename = "type")]
    kind: &'a str,
    data: &'a T,
}

/// Serialize a tagged frame to a text message.
pub fn json_frame<T: Serialize>(kind: &str, data: &T) -> Result<Message, serde_json::Error> {
    let text = serde_json::to_string(&Frame { kind, data })?;
    Ok(Message::Text(text.into()))
}

impl WsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and return the receiver its writer task drains.
    pub async fn add(&self, conn_id: Uuid, user_id: Option<DbId>) -> mpsc::UnboundedReceiver<Message> {
        let (sender, rx) = mpsc::unbounded_channel();
        self.connections.write().await.insert(
            conn_id,
            WsConnection {
                user_id,
                sender,
                connected_at: chrono::Utc::now(),
            },
        );
        rx
    }

    pub async fn remove(&self, conn_id: &Uuid) {
        self.connections.write().await.remove(conn_id);
    }

    /// Send to every connection.
    pub async fn broadcast(&self, message: Message) {
        for conn in self.connections.read().await.values() {
            let _ = conn.sender.send(message.clone());
        }
    }

    /// Send to every connection of `user_id`; returns how many were reached.
    pub async fn send_to_user(&self, user_id: DbId, message: Message) -> usize {
        let conns = self.connections.read().await;
        conns
            .values()
            .filter(|c| c.user_id == Some(user_id))
            .filter(|c| c.sender.send(message.clone()).is_ok())
            .count()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Number of distinct signed-in users with at least one open socket.
    pub async fn online_user_count(&self) -> usize {
        let conns = self.connections.read().await;
        let mut users: Vec<DbId> = conns.values().filter_map(|c| c.user_id).collect();
        users.sort_unstable();
        users.dedup();
        users.len()
    }

    pub async fn ping_all(&self) {
        self.broadcast(Message::Ping(Bytes::new())).await;
    }

    /// Send a Close frame everywhere and forget all connections.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        let count = conns.len();
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }
}
