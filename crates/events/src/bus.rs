//! In-process change feed backed by a `tokio::sync::broadcast` channel.
//!
//! Every mutation publishes a [`ChangeEvent`] naming the table and row that
//! changed. Subscribers (the websocket fan-out) forward them to clients,
//! which refetch whatever they are showing.

use aidlink_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

/// A row-level change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Table name, e.g. `"projects"` or `"funds"`.
    pub table: String,
    pub action: ChangeAction,
    pub record_id: DbId,
    /// Project the row belongs to, when there is one.
    pub project_id: Option<DbId>,
    /// User who made the change.
    pub user_id: Option<DbId>,
    pub timestamp: Timestamp,
}

impl ChangeEvent {
    pub fn new(table: impl Into<String>, action: ChangeAction, record_id: DbId) -> Self {
        Self {
            table: table.into(),
            action,
            record_id,
            project_id: None,
            user_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_project(mut self, project_id: DbId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_user(mut self, user_id: DbId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out bus.
///
/// Shared via `Arc<EventBus>`. When the buffer is full the oldest
/// un-consumed events are dropped and slow receivers observe
/// `RecvError::Lagged`.
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers. Dropped silently when
    /// nobody is listening.
    pub fn publish(&self, event: ChangeEvent) {
        tracing::trace!(table = %event.table, record_id = event.record_id, "Change published");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_change() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(
            ChangeEvent::new("funds", ChangeAction::Insert, 42)
                .with_project(7)
                .with_user(3),
        );

        for rx in [&mut rx1, &mut rx2] {
            let event = rx.recv().await.expect("should receive the event");
            assert_eq!(event.table, "funds");
            assert_eq!(event.action, ChangeAction::Insert);
            assert_eq!(event.record_id, 42);
            assert_eq!(event.project_id, Some(7));
            assert_eq!(event.user_id, Some(3));
        }
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let bus = EventBus::default();
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(ChangeEvent::new("projects", ChangeAction::Delete, 1));
    }

    #[test]
    fn serializes_action_in_snake_case() {
        let json = serde_json::to_value(ChangeEvent::new("projects", ChangeAction::Update, 5))
            .unwrap();
        assert_eq!(json["action"], "update");
        assert_eq!(json["table"], "projects");
        assert!(json["project_id"].is_null());
    }
}
