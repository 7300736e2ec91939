//! Event bus to WebSocket bridge.

use std::sync::Arc;

use tokio::sync::broadcast;

use aidlink_events::ChangeEvent;

use crate::ws::manager::json_frame;
use crate::ws::WsManager;

/// Forwards change events to every open socket as `{ "type": "change" }`
/// frames. Clients refetch whatever list the event's table touches.
pub struct ChangeFeed {
    ws_manager: Arc<WsManager>,
}

impl ChangeFeed {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run until the event bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<ChangeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.forward(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Change feed lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, change feed shutting down");
                    break;
                }
            }
        }
    }

    async fn forward(&self, event: &ChangeEvent) {
        match json_frame("change", event) {
            Ok(message) => self.ws_manager.broadcast(message).await,
            Err(e) => {
                tracing::error!(error = %e, table = %event.table, "Failed to encode change event");
            }
        }
    }
}
