use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aidlink_api::config::ServerConfig;
use aidlink_api::notifications::{ChangeFeed, Notifier};
use aidlink_api::router::build_app_router;
use aidlink_api::state::AppState;
use aidlink_api::ws;
use aidlink_events::{EmailDelivery, EventBus};
use aidlink_paymongo::PaymongoClient;

/// How long shutdown waits for background tasks to drain.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aidlink_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        email = config.email.is_some(),
        webhooks = config.paymongo_webhook_secret.is_some(),
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = aidlink_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    aidlink_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    aidlink_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- WebSocket manager and heartbeat ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_cancel = CancellationToken::new();
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager), heartbeat_cancel.clone());

    // --- Change feed ---
    let event_bus = Arc::new(EventBus::default());
    let feed_handle = tokio::spawn(ChangeFeed::new(Arc::clone(&ws_manager)).run(event_bus.subscribe()));

    // --- Notifications ---
    let email = config.email.clone().and_then(|c| match EmailDelivery::new(c) {
        Ok(delivery) => Some(delivery),
        Err(e) => {
            tracing::error!(error = %e, "Email delivery disabled: SMTP setup failed");
            None
        }
    });
    let notifier = Arc::new(Notifier::new(pool.clone(), Arc::clone(&ws_manager), email));
    tracing::info!(email_enabled = notifier.email_enabled(), "Notifier ready");

    // --- Payment gateway ---
    let paymongo =
        PaymongoClient::new(config.paymongo.clone()).expect("Failed to build PayMongo client");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        paymongo,
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
        notifier,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The router held the other state clones; dropping the last sender
    // closes the broadcast channel and ends the change feed.
    drop(event_bus);
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, feed_handle).await;

    heartbeat_cancel.cancel();
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, heartbeat_handle).await;

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    tracing::info!("Graceful shutdown complete");
}

/// Resolve on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
