use std::sync::Arc;

use aidlink_events::{ChangeEvent, EventBus};
use aidlink_paymongo::PaymongoClient;

use crate::config::ServerConfig;
use crate::notifications::Notifier;
use crate::ws::WsManager;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or is itself a handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: aidlink_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// PayMongo REST client.
    pub paymongo: PaymongoClient,
    /// Browser WebSocket connections.
    pub ws_manager: Arc<WsManager>,
    /// Realtime change feed.
    pub event_bus: Arc<EventBus>,
    /// Notification rows plus WebSocket and email fan-out.
    pub notifier: Arc<Notifier>,
}

impl AppState {
    /// Publish a change event for clients to refetch on.
    pub fn publish(&self, event: ChangeEvent) {
        self.event_bus.publish(event);
    }
}
