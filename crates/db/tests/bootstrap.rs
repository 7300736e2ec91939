use sqlx::PgPool;

use aidlink_db::repositories::{RoleRepo, SectorRepo};

#[sqlx::test(migrations = "./migrations")]
async fn test_health_check(pool: PgPool) {
    aidlink_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn test_roles_are_seeded(pool: PgPool) {
    let roles = RoleRepo::list(&pool).await.unwrap();
    let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["admin", "user"]);

    let admin = RoleRepo::find_by_name(&pool, "admin").await.unwrap().unwrap();
    assert_eq!(
        RoleRepo::resolve_name(&pool, admin.id).await.unwrap().as_deref(),
        Some("admin")
    );
    assert!(RoleRepo::resolve_name(&pool, 999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_default_sectors_are_seeded(pool: PgPool) {
    let sectors = SectorRepo::list(&pool).await.unwrap();
    let names: Vec<&str> = sectors.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Community", "Education", "Environment", "Health"]);
    assert!(sectors.iter().all(|s| s.project_count == 0 && s.total_raised == 0));
}

/// Every table with an `updated_at` column must refresh it on update.
#[sqlx::test(migrations = "./migrations")]
async fn test_updated_at_trigger(pool: PgPool) {
    let (before,): (chrono::DateTime<chrono::Utc>,) =
        sqlx::query_as("SELECT updated_at FROM sectors WHERE name = 'Health'")
            .fetch_one(&pool)
            .await
            .unwrap();

    sqlx::query("UPDATE sectors SET description = 'changed' WHERE name = 'Health'")
        .execute(&pool)
        .await
        .unwrap();

    let (after,): (chrono::DateTime<chrono::Utc>,) =
        sqlx::query_as("SELECT updated_at FROM sectors WHERE name = 'Health'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(after >= before);
}
