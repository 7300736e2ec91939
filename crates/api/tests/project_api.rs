//! HTTP-level tests for project proposals, visibility, moderation, bank
//! details and sectors.

mod common;

use axum::http::StatusCode;
use common::{
    admin_with_token, body_json, create_approved_project, create_project, create_sector,
    delete_auth, expect_status, get, get_auth, post_json_auth, put_json_auth, user_with_token,
};
use serde_json::json;
use sqlx::PgPool;

use aidlink_core::status::{FundStatus, PaymentMethodKind};
use aidlink_db::models::fund::{CreateFund, SettleFund};
use aidlink_db::repositories::{BankDetailRepo, FundRepo, NotificationRepo};

fn proposal(sector_id: i64) -> serde_json::Value {
    json!({
        "sector_id": sector_id,
        "title": "Laptops for scholars",
        "description": "Twenty refurbished laptops for working students.",
        "target_amount": 5_000_000,
        "location": "Quezon City",
        "bank_details": {
            "account_name": "Ana Reyes",
            "account_number": "0012-3456-7890",
            "bank_name": "BPI"
        }
    })
}

// ---------------------------------------------------------------------------
// Proposals
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn proposing_a_project_stores_it_pending_and_notifies_admins(pool: PgPool) {
    let (admin, _) = admin_with_token(&pool, "Admin One").await;
    let (_owner, token) = user_with_token(&pool, "Ana Reyes").await;
    let sector = create_sector(&pool, "Scholarships").await;

    let app = common::build_test_app(pool.clone());
    let json = expect_status(
        post_json_auth(app, "/api/v1/projects", &token, proposal(sector.id)).await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(json["data"]["status"], "pending");
    let project_id = json["data"]["id"].as_i64().unwrap();

    // Bank details are stored encrypted, never as plain text.
    let row = BankDetailRepo::find_by_project(&pool, project_id)
        .await
        .unwrap()
        .expect("bank details row");
    assert!(!row.encrypted().account_number.contains("7890"));

    assert_eq!(NotificationRepo::unread_count(&pool, admin.id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn proposal_validation_errors_are_400(pool: PgPool) {
    let (_owner, token) = user_with_token(&pool, "Ana Reyes").await;
    let sector = create_sector(&pool, "Scholarships").await;

    let mut body = proposal(sector.id);
    body["title"] = json!("Tiny");
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/projects", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut body = proposal(sector.id);
    body["target_amount"] = json!(50);
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/projects", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = proposal(sector.id + 1000);
    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/projects", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn public_listing_shows_only_live_projects(pool: PgPool) {
    let (owner, _) = user_with_token(&pool, "Ana Reyes").await;
    let sector = create_sector(&pool, "Scholarships").await;
    create_project(&pool, owner.id, sector.id, "Still pending").await;
    let live = create_approved_project(&pool, owner.id, sector.id, "Already live").await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/projects").await).await;

    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["id"], live.id);
    assert_eq!(json["data"][0]["progress_pct"], 0.0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_admins_cannot_list_pending_projects(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "Ana Reyes").await;
    let (_admin, admin_token) = admin_with_token(&pool, "Admin One").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/projects?status=pending", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/projects?status=pending", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn pending_project_is_hidden_from_strangers(pool: PgPool) {
    let (owner, owner_token) = user_with_token(&pool, "Ana Reyes").await;
    let (_other, other_token) = user_with_token(&pool, "Ben Cruz").await;
    let sector = create_sector(&pool, "Scholarships").await;
    let project = create_project(&pool, owner.id, sector.id, "Laptops for scholars").await;
    let uri = format!("/api/v1/projects/{}", project.id);

    let app = common::build_test_app(pool.clone());
    assert_eq!(get(app, &uri).await.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool.clone());
    assert_eq!(get_auth(app, &uri, &other_token).await.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool.clone());
    assert_eq!(get_auth(app, &uri, &owner_token).await.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/projects/mine", &owner_token).await).await;
    assert_eq!(json["total"], 1);
}

// ---------------------------------------------------------------------------
// Moderation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_approves_and_owner_is_notified(pool: PgPool) {
    let (owner, owner_token) = user_with_token(&pool, "Ana Reyes").await;
    let (_admin, admin_token) = admin_with_token(&pool, "Admin One").await;
    let sector = create_sector(&pool, "Scholarships").await;
    let project = create_project(&pool, owner.id, sector.id, "Laptops for scholars").await;
    let uri = format!("/api/v1/admin/projects/{}/approve", project.id);

    // Owners cannot approve their own proposal.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, &owner_token, json!({})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let json = expect_status(
        post_json_auth(app, &uri, &admin_token, json!({})).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["status"], "approved");
    assert!(json["data"]["approved_at"].is_string());

    let notes = NotificationRepo::list_for_user(&pool, owner.id, false, 10, 0)
        .await
        .unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, "project_approved");

    // Approving twice is not a valid transition.
    let app = common::build_test_app(pool);
    let response = post_json_auth(app, &uri, &admin_token, json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rejected_project_is_resubmitted_by_editing(pool: PgPool) {
    let (owner, owner_token) = user_with_token(&pool, "Ana Reyes").await;
    let (_admin, admin_token) = admin_with_token(&pool, "Admin One").await;
    let sector = create_sector(&pool, "Scholarships").await;
    let project = create_project(&pool, owner.id, sector.id, "Laptops for scholars").await;
    let reject_uri = format!("/api/v1/admin/projects/{}/reject", project.id);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &reject_uri, &admin_token, json!({ "reason": "  " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let json = expect_status(
        post_json_auth(
            app,
            &reject_uri,
            &admin_token,
            json!({ "reason": "Please add a budget breakdown" }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["status"], "rejected");
    assert_eq!(json["data"]["rejection_reason"], "Please add a budget breakdown");

    let app = common::build_test_app(pool);
    let body = json!({ "description": "Twenty laptops. Budget: 20 x PHP 2,500 each." });
    let json = expect_status(
        put_json_auth(app, &format!("/api/v1/projects/{}", project.id), &owner_token, body).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["status"], "pending");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn approved_project_cannot_be_edited_or_withdrawn(pool: PgPool) {
    let (owner, owner_token) = user_with_token(&pool, "Ana Reyes").await;
    let sector = create_sector(&pool, "Scholarships").await;
    let project = create_approved_project(&pool, owner.id, sector.id, "Laptops for scholars").await;
    let uri = format!("/api/v1/projects/{}", project.id);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, &owner_token, json!({ "title": "New title here" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool);
    let response = delete_auth(app, &uri, &owner_token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_cannot_delete_a_project_with_donations(pool: PgPool) {
    let (owner, _) = user_with_token(&pool, "Ana Reyes").await;
    let (donor, _) = user_with_token(&pool, "Ben Cruz").await;
    let (_admin, admin_token) = admin_with_token(&pool, "Admin One").await;
    let sector = create_sector(&pool, "Scholarships").await;
    let project = create_approved_project(&pool, owner.id, sector.id, "Laptops for scholars").await;

    let fund = FundRepo::create(
        &pool,
        &CreateFund {
            project_id: project.id,
            sector_id: project.sector_id,
            donor_id: donor.id,
            amount: 50_000,
            payment_method: PaymentMethodKind::Gcash,
            is_anonymous: false,
            message: None,
            reference_number: None,
            proof_url: None,
        },
    )
    .await
    .unwrap();
    FundRepo::set_status(&pool, fund.id, FundStatus::Paid, &SettleFund::default())
        .await
        .unwrap()
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/projects/{}", project.id);
    let json = expect_status(delete_auth(app, &uri, &admin_token).await, StatusCode::CONFLICT).await;
    assert_eq!(json["code"], "CONFLICT");

    let fund = FundRepo::find_by_id(&pool, fund.id).await.unwrap().unwrap();
    assert_eq!(fund.status(), FundStatus::Paid);
    assert_eq!(FundRepo::total_paid(&pool, Some(project.id)).await.unwrap(), 50_000);

    let empty = create_approved_project(&pool, owner.id, sector.id, "Book drive").await;
    let app = common::build_test_app(pool);
    let response = delete_auth(app, &format!("/api/v1/projects/{}", empty.id), &admin_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn proposal_is_stored_even_when_admins_cannot_be_notified(pool: PgPool) {
    let (_owner, token) = user_with_token(&pool, "Ana Reyes").await;
    let sector = create_sector(&pool, "Scholarships").await;

    // Admin and proposer lookups now fail; the insert itself does not touch them.
    sqlx::query("ALTER TABLE users RENAME TO users_archived")
        .execute(&pool)
        .await
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let json = expect_status(
        post_json_auth(app, "/api/v1/projects", &token, proposal(sector.id)).await,
        StatusCode::CREATED,
    )
    .await;
    let project_id = json["data"]["id"].as_i64().unwrap();

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

// ---------------------------------------------------------------------------
// Bank details
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn bank_details_are_masked_for_everyone_but_owner_and_admin(pool: PgPool) {
    let (owner, owner_token) = user_with_token(&pool, "Ana Reyes").await;
    let (_donor, donor_token) = user_with_token(&pool, "Ben Cruz").await;
    let sector = create_sector(&pool, "Scholarships").await;
    let project = create_approved_project(&pool, owner.id, sector.id, "Laptops for scholars").await;
    let uri = format!("/api/v1/projects/{}/bank-details", project.id);

    let app = common::build_test_app(pool.clone());
    let body = json!({
        "account_name": "Ana Reyes",
        "account_number": "0012-3456-7890",
        "bank_name": "BPI"
    });
    expect_status(put_json_auth(app, &uri, &owner_token, body).await, StatusCode::OK).await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, &uri, &owner_token).await).await;
    assert_eq!(json["data"]["account_number"], "0012-3456-7890");
    assert_eq!(json["data"]["masked"], false);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, &uri, &donor_token).await).await;
    assert_eq!(json["data"]["account_number"], "********7890");
    assert_eq!(json["data"]["masked"], true);
}

// ---------------------------------------------------------------------------
// Sectors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn sector_admin_crud_and_in_use_delete_conflict(pool: PgPool) {
    let (owner, user_token) = user_with_token(&pool, "Ana Reyes").await;
    let (_admin, admin_token) = admin_with_token(&pool, "Admin One").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/admin/sectors", &user_token, json!({ "name": "Health" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let json = expect_status(
        post_json_auth(app, "/api/v1/admin/sectors", &admin_token, json!({ "name": "Health" })).await,
        StatusCode::CREATED,
    )
    .await;
    let sector_id = json["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/admin/sectors", &admin_token, json!({ "name": "Health" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    create_project(&pool, owner.id, sector_id, "Clinic supplies drive").await;
    let app = common::build_test_app(pool);
    let response = delete_auth(app, &format!("/api/v1/admin/sectors/{sector_id}"), &admin_token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
