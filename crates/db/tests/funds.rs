//! Repository tests for donations.

mod common;

use aidlink_core::status::{FundStatus, PaymentMethodKind};
use aidlink_db::models::fund::{FundFilter, SettleFund};
use aidlink_db::repositories::FundRepo;
use assert_matches::assert_matches;
use sqlx::PgPool;

use common::*;

#[sqlx::test(migrations = "./migrations")]
async fn test_fund_settles_only_once(pool: PgPool) {
    let owner = create_user(&pool, "Ana Reyes", "user").await;
    let donor = create_user(&pool, "Ben Cruz", "user").await;
    let sector = create_sector(&pool, "Scholarships").await;
    let project = create_approved_project(&pool, owner.id, sector.id, "Laptop fund").await;

    let fund = FundRepo::create(&pool, &new_fund(&project, donor.id, 15_000))
        .await
        .unwrap();
    assert_eq!(fund.status(), FundStatus::Pending);
    assert_eq!(fund.payment_method(), PaymentMethodKind::Gcash);

    FundRepo::attach_intent(&pool, fund.id, "pi_abc123").await.unwrap().unwrap();
    let by_intent = FundRepo::find_by_payment_intent(&pool, "pi_abc123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_intent.id, fund.id);

    let paid = FundRepo::set_status(
        &pool,
        fund.id,
        FundStatus::Paid,
        &SettleFund {
            payment_id: Some("pay_xyz".to_string()),
            failure_reason: None,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(paid.status(), FundStatus::Paid);
    assert!(paid.paid_at.is_some());
    assert_eq!(paid.payment_id.as_deref(), Some("pay_xyz"));

    // A late failure event does not overwrite the paid donation.
    let again = FundRepo::set_status(
        &pool,
        fund.id,
        FundStatus::Failed,
        &SettleFund {
            payment_id: None,
            failure_reason: Some("card_declined".to_string()),
        },
    )
    .await
    .unwrap();
    assert!(again.is_none());
    let current = FundRepo::find_by_id(&pool, fund.id).await.unwrap().unwrap();
    assert_eq!(current.status(), FundStatus::Paid);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_payment_intent_is_unique(pool: PgPool) {
    let owner = create_user(&pool, "Ana Reyes", "user").await;
    let donor = create_user(&pool, "Ben Cruz", "user").await;
    let sector = create_sector(&pool, "Scholarships").await;
    let project = create_approved_project(&pool, owner.id, sector.id, "Laptop fund").await;

    let a = FundRepo::create(&pool, &new_fund(&project, donor.id, 15_000)).await.unwrap();
    let b = FundRepo::create(&pool, &new_fund(&project, donor.id, 15_000)).await.unwrap();
    FundRepo::attach_intent(&pool, a.id, "pi_same").await.unwrap();
    let err = FundRepo::attach_intent(&pool, b.id, "pi_same").await.unwrap_err();
    assert_matches!(err, sqlx::Error::Database(ref db) if db.constraint() == Some("uq_funds_payment_intent_id"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_anonymous_donors_hidden_from_public_list(pool: PgPool) {
    let owner = create_user(&pool, "Ana Reyes", "user").await;
    let donor = create_user(&pool, "Ben Cruz", "user").await;
    let shy = create_user(&pool, "Carla Diaz", "user").await;
    let sector = create_sector(&pool, "Scholarships").await;
    let project = create_approved_project(&pool, owner.id, sector.id, "Laptop fund").await;

    create_paid_fund(&pool, &project, donor.id, 10_000).await;
    let mut anonymous = new_fund(&project, shy.id, 20_000);
    anonymous.is_anonymous = true;
    let fund = FundRepo::create(&pool, &anonymous).await.unwrap();
    FundRepo::set_status(&pool, fund.id, FundStatus::Paid, &SettleFund::default())
        .await
        .unwrap();

    let public = FundRepo::list_for_project(&pool, project.id, true, 50, 0)
        .await
        .unwrap();
    assert_eq!(public.len(), 2);
    let hidden = public.iter().find(|f| f.is_anonymous).unwrap();
    assert!(hidden.donor_name.is_none());
    assert!(hidden.donor_id.is_none());
    let named = public.iter().find(|f| !f.is_anonymous).unwrap();
    assert_eq!(named.donor_name.as_deref(), Some("Ben Cruz"));

    let privileged = FundRepo::list_for_project(&pool, project.id, false, 50, 0)
        .await
        .unwrap();
    assert!(privileged.iter().all(|f| f.donor_name.is_some()));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_donor_listing_and_totals(pool: PgPool) {
    let owner = create_user(&pool, "Ana Reyes", "user").await;
    let donor = create_user(&pool, "Ben Cruz", "user").await;
    let other = create_user(&pool, "Carla Diaz", "user").await;
    let sector = create_sector(&pool, "Scholarships").await;
    let project = create_approved_project(&pool, owner.id, sector.id, "Laptop fund").await;

    create_paid_fund(&pool, &project, donor.id, 10_000).await;
    create_paid_fund(&pool, &project, donor.id, 25_000).await;
    create_paid_fund(&pool, &project, other.id, 40_000).await;
    let mut transfer = new_fund(&project, donor.id, 500);
    transfer.payment_method = PaymentMethodKind::BankTransfer;
    transfer.reference_number = Some("REF-001".to_string());
    FundRepo::create(&pool, &transfer).await.unwrap();

    let mine = FundRepo::list_for_donor(&pool, donor.id, 50, 0).await.unwrap();
    assert_eq!(mine.len(), 3);
    assert!(mine.iter().all(|f| f.project_title == "Laptop fund"));

    let donors = FundRepo::distinct_donor_ids(&pool, project.id).await.unwrap();
    let mut expected = vec![donor.id, other.id];
    expected.sort();
    assert_eq!(donors, expected);

    assert_eq!(FundRepo::total_paid(&pool, Some(project.id)).await.unwrap(), 75_000);
    assert_eq!(FundRepo::total_paid(&pool, None).await.unwrap(), 75_000);

    let counts = FundRepo::count_by_status(&pool).await.unwrap();
    assert_eq!((counts.pending, counts.paid, counts.failed), (1, 3, 0));

    let pending_transfers = FundRepo::list(
        &pool,
        &FundFilter {
            status: Some(FundStatus::Pending),
            payment_method: Some(PaymentMethodKind::BankTransfer),
            ..Default::default()
        },
        50,
        0,
    )
    .await
    .unwrap();
    assert_eq!(pending_transfers.len(), 1);
    assert_eq!(pending_transfers[0].reference_number.as_deref(), Some("REF-001"));
}
