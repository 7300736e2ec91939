//! Notification delivery and the realtime change feed.
//!
//! - [`Notifier`] writes a notification row, pushes it to the recipient's
//!   sockets and optionally emails it.
//! - [`ChangeFeed`] forwards every [`ChangeEvent`](aidlink_events::ChangeEvent)
//!   on the event bus to all connected sockets.

pub mod change_feed;
pub mod notifier;

pub use change_feed::ChangeFeed;
pub use notifier::{Notice, Notifier};
