//! Fixtures shared by the repository integration tests.

#![allow(dead_code)]

use aidlink_core::status::{FundStatus, PaymentMethodKind, ProjectStatus};
use aidlink_core::types::DbId;
use aidlink_db::models::fund::{CreateFund, Fund, SettleFund};
use aidlink_db::models::project::{CreateProject, Project};
use aidlink_db::models::sector::{CreateSector, Sector};
use aidlink_db::models::user::{CreateUser, User};
use aidlink_db::repositories::{FundRepo, ProjectRepo, RoleRepo, SectorRepo, UserRepo};
use sqlx::PgPool;

pub async fn create_user(pool: &PgPool, name: &str, role: &str) -> User {
    let role = RoleRepo::find_by_name(pool, role).await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            full_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            password_hash: "not-a-real-hash".to_string(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
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

pub fn new_project(owner_id: DbId, sector_id: DbId, title: &str) -> CreateProject {
    CreateProject {
        owner_id,
        sector_id,
        title: title.to_string(),
        description: "A project description long enough to pass".to_string(),
        target_amount: 5_000_000,
        image_url: None,
        location: Some("Quezon City".to_string()),
        deadline: None,
    }
}

pub async fn create_project(pool: &PgPool, owner_id: DbId, sector_id: DbId, title: &str) -> Project {
    ProjectRepo::create(pool, &new_project(owner_id, sector_id, title), None)
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

pub fn new_fund(project: &Project, donor_id: DbId, amount: i64) -> CreateFund {
    CreateFund {
        project_id: project.id,
        sector_id: project.sector_id,
        donor_id,
        amount,
        payment_method: PaymentMethodKind::Gcash,
        is_anonymous: false,
        message: None,
        reference_number: None,
        proof_url: None,
    }
}

pub async fn create_paid_fund(pool: &PgPool, project: &Project, donor_id: DbId, amount: i64) -> Fund {
    let fund = FundRepo::create(pool, &new_fund(project, donor_id, amount))
        .await
        .unwrap();
    FundRepo::set_status(pool, fund.id, FundStatus::Paid, &SettleFund::default())
        .await
        .unwrap()
        .unwrap()
}
