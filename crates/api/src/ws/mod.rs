//! WebSocket layer: connection registry, upgrade handler and heartbeat.
//!
//! Outbound frames are JSON text messages tagged with `type`:
//! `"change"` for change feed events (every socket) and `"notification"`
//! for a user's own notifications (that user's sockets only).

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
