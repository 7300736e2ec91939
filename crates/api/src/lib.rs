//! AidLink API server library.
//!
//! Exposes configuration, state, error handling, routes, the notification
//! service and the WebSocket layer so both the binary entrypoint and the
//! integration tests build the same application.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod payments;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
