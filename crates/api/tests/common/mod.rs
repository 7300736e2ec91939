//! Shared harness for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use aidlink_api::auth::jwt::{generate_access_token, JwtConfig};
use aidlink_api::auth::password::hash_password;
use aidlink_api::config::ServerConfig;
use aidlink_api::notifications::Notifier;
use aidlink_api::router::build_app_router;
use aidlink_api::state::AppState;
use aidlink_api::ws::WsManager;
use aidlink_core::crypto::BankCipher;
use aidlink_core::status::ProjectStatus;
use aidlink_core::types::DbId;
use aidlink_db::models::project::{CreateProject, Project};
use aidlink_db::models::sector::{CreateSector, Sector};
use aidlink_db::models::user::{CreateUser, User};
use aidlink_db::repositories::{ProjectRepo, RoleRepo, SectorRepo, UserRepo};
use aidlink_events::EventBus;
use aidlink_paymongo::{PaymongoClient, PaymongoConfig};

pub const PASSWORD: &str = "correct-horse-battery";
pub const WEBHOOK_SECRET: &str = "whsk_test_secret";
pub const JWT_SECRET: &str = "test-jwt-secret-that-is-long-enough";

/// Nothing listens here; handlers that reach the gateway get a 502.
const UNREACHABLE_GATEWAY: &str = "http://127.0.0.1:9";

pub fn test_config(paymongo_base_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        bank_cipher: BankCipher::new(&[7u8; 32]),
        paymongo: PaymongoConfig::new("sk_test_123", paymongo_base_url),
        paymongo_webhook_secret: Some(WEBHOOK_SECRET.to_string()),
        payment_return_url: "http://localhost:5173/donations/return".to_string(),
        app_base_url: "http://localhost:5173".to_string(),
        email: None,
    }
}

/// Build the application exactly as `main.rs` does, against `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_gateway(pool, UNREACHABLE_GATEWAY)
}

/// Like [`build_test_app`] but with PayMongo pointed at `base_url`
/// (an `httpmock` server).
pub fn build_test_app_with_gateway(pool: PgPool, base_url: &str) -> Router {
    build_test_app_from_config(pool, test_config(base_url))
}

pub fn build_test_app_from_config(pool: PgPool, config: ServerConfig) -> Router {
    let ws_manager = Arc::new(WsManager::new());
    let notifier = Arc::new(Notifier::new(pool.clone(), Arc::clone(&ws_manager), None));
    let paymongo = PaymongoClient::new(config.paymongo.clone()).unwrap();

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        paymongo,
        ws_manager,
        event_bus: Arc::new(EventBus::default()),
        notifier,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header("authorization", format!("Bearer {token}")),
        None => builder,
    }
}

fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    builder(method, uri, token)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, builder(Method::GET, uri, None).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(
        app,
        builder(Method::GET, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(
        app,
        builder(Method::POST, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(
        app,
        builder(Method::DELETE, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// POST a raw body with extra headers (webhook deliveries).
pub async fn post_raw(app: Router, uri: &str, headers: &[(&str, &str)], body: Vec<u8>) -> Response {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send(app, builder.body(Body::from(body)).unwrap()).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status, printing the body when it does not match.
pub async fn expect_status(response: Response, expected: StatusCode) -> serde_json::Value {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    assert_eq!(status, expected, "unexpected status, body: {json}");
    json
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`PASSWORD`] and the given role name.
pub async fn create_user(pool: &PgPool, name: &str, role: &str) -> User {
    let role = RoleRepo::find_by_name(pool, role).await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            full_name: name.to_string(),
            email: email_for(name),
            password_hash: hash_password(PASSWORD).unwrap(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
}

pub fn email_for(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase().replace(' ', "."))
}

pub fn token_for(user: &User, role: &str) -> String {
    generate_access_token(user.id, role, &test_config(UNREACHABLE_GATEWAY).jwt).unwrap()
}

/// A user plus a valid access token for them.
pub async fn user_with_token(pool: &PgPool, name: &str) -> (User, String) {
    let user = create_user(pool, name, "user").await;
    let token = token_for(&user, "user");
    (user, token)
}

pub async fn admin_with_token(pool: &PgPool, name: &str) -> (User, String) {
    let user = create_user(pool, name, "admin").await;
    let token = token_for(&user, "admin");
    (user, token)
}

pub async fn create_sector(pool: &PgPool, name: &str) -> Sector {
    SectorRepo::create(
        pool,
        &CreateSector {
            name: name.to_string(),
            description: None,
        },
    )
    .await
    .unwrap()
}

pub async fn create_project(pool: &PgPool, owner_id: DbId, sector_id: DbId, title: &str) -> Project {
    ProjectRepo::create(
        pool,
        &CreateProject {
            owner_id,
            sector_id,
            title: title.to_string(),
            description: "Laptops for scholars who study at night".to_string(),
            target_amount: 5_000_000,
            image_url: None,
            location: Some("Quezon City".to_string()),
            deadline: None,
        },
        None,
    )
    .await
    .unwrap()
}

pub async fn create_approved_project(
    pool: &PgPool,
    owner_id: DbId,
    sector_id: DbId,
    title: &str,
) -> Project {
    let project = create_project(pool, owner_id, sector_id, title).await;
    ProjectRepo::set_status(
        pool,
        project.id,
        ProjectStatus::Pending,
        ProjectStatus::Approved,
        None,
    )
    .await
    .unwrap()
    .unwrap()
}
