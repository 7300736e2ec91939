//! Unit tests for `WsManager`.
//!
//! These exercise the connection registry directly, without HTTP upgrades:
//! add/remove, broadcast, per-user delivery and shutdown.

use aidlink_api::ws::manager::json_frame;
use assert_matches::assert_matches;
use aidlink_api::ws::WsManager;
use axum::extract::ws::Message;
use serde_json::json;
use uuid::Uuid;

fn text(message: Message) -> serde_json::Value {
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);

    let first = Uuid::new_v4();
    let _rx1 = manager.add(first, None).await;
    let _rx2 = manager.add(Uuid::new_v4(), Some(7)).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove(&first).await;
    assert_eq!(manager.connection_count().await, 1);

    // Unknown ids are ignored.
    manager.remove(&Uuid::new_v4()).await;
    assert_eq!(manager.connection_count().await, 1);
}

#[tokio::test]
async fn broadcast_reaches_anonymous_and_signed_in_sockets() {
    let manager = WsManager::new();
    let mut anon = manager.add(Uuid::new_v4(), None).await;
    let mut user = manager.add(Uuid::new_v4(), Some(1)).await;

    let frame = json_frame("change", &json!({ "table": "funds" })).unwrap();
    manager.broadcast(frame).await;

    for rx in [&mut anon, &mut user] {
        let value = text(rx.recv().await.unwrap());
        assert_eq!(value["type"], "change");
        assert_eq!(value["data"]["table"], "funds");
    }
}

#[tokio::test]
async fn send_to_user_only_reaches_that_users_sockets() {
    let manager = WsManager::new();
    let mut phone = manager.add(Uuid::new_v4(), Some(1)).await;
    let mut laptop = manager.add(Uuid::new_v4(), Some(1)).await;
    let mut other = manager.add(Uuid::new_v4(), Some(2)).await;
    let mut anon = manager.add(Uuid::new_v4(), None).await;
    assert_eq!(manager.online_user_count().await, 2);

    let frame = json_frame("notification", &json!({ "title": "Hello" })).unwrap();
    let reached = manager.send_to_user(1, frame).await;
    assert_eq!(reached, 2);

    assert_eq!(text(phone.recv().await.unwrap())["type"], "notification");
    assert_eq!(text(laptop.recv().await.unwrap())["data"]["title"], "Hello");
    assert!(other.try_recv().is_err());
    assert!(anon.try_recv().is_err());
}

#[tokio::test]
async fn send_to_user_skips_dropped_receivers() {
    let manager = WsManager::new();
    let rx = manager.add(Uuid::new_v4(), Some(5)).await;
    drop(rx);

    let frame = json_frame("notification", &json!({})).unwrap();
    assert_eq!(manager.send_to_user(5, frame).await, 0);
    assert_eq!(manager.send_to_user(99, Message::Ping(Default::default())).await, 0);
}

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let mut rx1 = manager.add(Uuid::new_v4(), None).await;
    let mut rx2 = manager.add(Uuid::new_v4(), Some(3)).await;

    manager.shutdown_all().await;
    assert_eq!(manager.connection_count().await, 0);

    assert_matches!(rx1.recv().await, Some(Message::Close(None)));
    assert_matches!(rx2.recv().await, Some(Message::Close(None)));
}

#[tokio::test]
async fn ping_all_sends_ping_frames() {
    let manager = WsManager::new();
    let mut rx = manager.add(Uuid::new_v4(), None).await;

    manager.ping_all().await;

    assert_matches!(rx.recv().await, Some(Message::Ping(_)));
}
