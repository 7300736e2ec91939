//! AidLink change feed and notification delivery.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, carrying [`ChangeEvent`]s for the realtime
//!   feed.
//! - [`delivery`] -- external delivery channels (email).

pub mod bus;
pub mod delivery;

pub use bus::{ChangeAction, ChangeEvent, EventBus};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError, EmailMessage};
