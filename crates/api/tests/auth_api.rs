//! HTTP-level tests for sign-up, sign-in, lockout, refresh rotation,
//! sign-out and the caller's profile.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user, email_for, expect_status, get, get_auth, post_json, post_json_auth,
    put_json_auth, PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

use aidlink_db::repositories::UserRepo;

async fn sign_in(app: axum::Router, email: &str, password: &str) -> axum::response::Response {
    post_json(
        app,
        "/api/v1/auth/sign-in",
        json!({ "email": email, "password": password }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Sign-up
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn sign_up_creates_user_and_returns_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "full_name": "Maria Santos",
        "email": "Maria@Example.com",
        "password": "long-enough-password"
    });

    let json = expect_status(
        post_json(app, "/api/v1/auth/sign-up", body).await,
        StatusCode::CREATED,
    )
    .await;

    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert!(json["expires_in"].is_number());
    assert_eq!(json["user"]["email"], "maria@example.com");
    assert_eq!(json["user"]["role"], "user");
    assert!(json["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sign_up_with_taken_email_is_conflict(pool: PgPool) {
    create_user(&pool, "Maria Santos", "user").await;
    let app = common::build_test_app(pool);

    let body = json!({
        "full_name": "Another Maria",
        "email": email_for("Maria Santos"),
        "password": "long-enough-password"
    });
    let json = expect_status(
        post_json(app, "/api/v1/auth/sign-up", body).await,
        StatusCode::CONFLICT,
    )
    .await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sign_up_rejects_short_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "full_name": "Maria Santos",
        "email": "maria@example.com",
        "password": "short"
    });

    let json = expect_status(
        post_json(app, "/api/v1/auth/sign-up", body).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("password"));
}

// ---------------------------------------------------------------------------
// Sign-in and lockout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn sign_in_success(pool: PgPool) {
    let user = create_user(&pool, "Jose Rizal", "admin").await;
    let app = common::build_test_app(pool);

    let response = sign_in(app, &user.email, PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "admin");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sign_in_wrong_password_and_unknown_email_are_401(pool: PgPool) {
    let user = create_user(&pool, "Jose Rizal", "user").await;

    let app = common::build_test_app(pool.clone());
    let response = sign_in(app, &user.email, "not-the-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = sign_in(app, "ghost@example.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sign_in_deactivated_account_is_403(pool: PgPool) {
    let user = create_user(&pool, "Jose Rizal", "user").await;
    UserRepo::deactivate(&pool, user.id).await.unwrap();
    let app = common::build_test_app(pool);

    let response = sign_in(app, &user.email, PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn five_failures_lock_the_account(pool: PgPool) {
    let user = create_user(&pool, "Jose Rizal", "user").await;

    for _ in 0..5 {
        let app = common::build_test_app(pool.clone());
        let response = sign_in(app, &user.email, "wrong-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while locked.
    let app = common::build_test_app(pool.clone());
    let response = sign_in(app, &user.email, PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let locked = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(locked.locked_until.is_some());
}

// ---------------------------------------------------------------------------
// Refresh and sign-out
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_and_old_token_is_single_use(pool: PgPool) {
    let user = create_user(&pool, "Jose Rizal", "user").await;

    let app = common::build_test_app(pool.clone());
    let login = body_json(sign_in(app, &user.email, PASSWORD).await).await;
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_ne!(json["refresh_token"].as_str().unwrap(), refresh_token);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sign_out_revokes_refresh_tokens(pool: PgPool) {
    let user = create_user(&pool, "Jose Rizal", "user").await;

    let app = common::build_test_app(pool.clone());
    let login = body_json(sign_in(app, &user.email, PASSWORD).await).await;
    let access = login["access_token"].as_str().unwrap();
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/auth/sign-out", access, json!({})).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn me_requires_a_valid_token(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", "not.a.jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_me_changes_profile(pool: PgPool) {
    let (user, token) = common::user_with_token(&pool, "Jose Rizal").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "full_name": "Jose P. Rizal", "phone": "+639171234567" });
    let json = expect_status(
        put_json_auth(app, "/api/v1/auth/me", &token, body).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["full_name"], "Jose P. Rizal");
    assert_eq!(json["data"]["phone"], "+639171234567");

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/auth/me", &token).await).await;
    assert_eq!(json["data"]["id"], user.id);
    assert_eq!(json["data"]["full_name"], "Jose P. Rizal");
}
