use sea_orm::{ActiveModelTrait, ActiveValue};

mod common;

#[tokio::test]
async fn withdrawal_requires_a_primary_account() {
    let (engine, _ledger, db) = common::setup().await;

    // A user row without any linked account.
    engine::users::ActiveModel {
        id: ActiveValue::Set("u-bare".to_string()),
        username: ActiveValue::Set("bare".to_string()),
        password: ActiveValue::Set("pw".to_string()),
        platform_id: ActiveValue::Set(None),
        primary_account_id: ActiveValue::Set(None),
        disclaimer_accepted: ActiveValue::Set(false),
    }
    .insert(&db)
    .await
    .unwrap();

    let err = engine
        .prepare_withdrawal("u-bare", 100, "addr-1")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "failed-precondition");
}

#[tokio::test]
async fn prepare_and_execute_run_against_the_primary_account() {
    let (engine, ledger, _db) = common::setup().await;

    let user = engine.register_user("alice", "pw", None).await.unwrap();
    let account_id = user.primary_account_id.clone().unwrap();
    ledger.deposit(&account_id, 1_000);

    let preview = engine
        .prepare_withdrawal(&user.id, 500, "addr-1")
        .await
        .unwrap();
    assert_eq!(preview.account_id, account_id);
    assert_eq!(preview.amount, 500);
    assert_eq!(preview.fee, 10);

    let withdrawal = engine
        .execute_withdrawal(&user.id, &preview.id)
        .await
        .unwrap();
    assert_eq!(withdrawal.account_id, account_id);
}

#[tokio::test]
async fn invalid_withdrawal_arguments_are_rejected() {
    let (engine, _ledger, _db) = common::setup().await;

    let user = engine.register_user("alice", "pw", None).await.unwrap();

    let err = engine
        .prepare_withdrawal(&user.id, 0, "addr-1")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid-argument");

    let err = engine
        .prepare_withdrawal(&user.id, 100, "")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid-argument");

    let err = engine.execute_withdrawal(&user.id, "").await.unwrap_err();
    assert_eq!(err.kind(), "invalid-argument");
}
