use chrono::Duration;
use engine::{TipStatus, transactions, unclaimed_tips};
use sea_orm::EntityTrait;

mod common;

/// Registered sender with funds, sighted (but unregistered) recipient.
async fn tipping_setup() -> (engine::Engine, std::sync::Arc<common::MockLedger>, sea_orm::DatabaseConnection)
{
    let (engine, ledger, db) = common::setup().await;

    let alice = engine
        .register_user("alice", "pw", Some((100, "alice")))
        .await
        .unwrap();
    let alice_account = alice.primary_account_id.expect("alice has no account");
    ledger.deposit(&alice_account, 10_000);

    engine.record_platform_user(200, "bob").await.unwrap();

    (engine, ledger, db)
}

#[tokio::test]
async fn successful_tip_writes_a_correlated_pair() {
    let (engine, ledger, db) = tipping_setup().await;

    let reply = engine
        .handle_tip_message(".tip @bob 1", 100, "alice")
        .await
        .expect("tip command ignored");

    assert!(reply.contains("`1.00 TPJ` tip successfully sent to @bob!"));
    assert_eq!(ledger.transfers(), vec![("acct-1".to_string(), "acct-2".to_string(), 100)]);

    let records = transactions::Entity::find().all(&db).await.unwrap();
    assert_eq!(records.len(), 2);

    let sender_leg = records
        .iter()
        .find(|record| record.amount < 0)
        .expect("sender leg missing");
    let recipient_leg = records
        .iter()
        .find(|record| record.amount > 0)
        .expect("recipient leg missing");

    assert_eq!(sender_leg.amount, -100);
    assert_eq!(recipient_leg.amount, 100);
    assert_eq!(sender_leg.amount + recipient_leg.amount, 0);
    assert_eq!(sender_leg.transfer_id, recipient_leg.transfer_id);
    assert_eq!(sender_leg.timestamp, recipient_leg.timestamp);
    assert_eq!(sender_leg.account_id, "acct-1");
    assert_eq!(recipient_leg.account_id, "acct-2");
    assert_eq!(recipient_leg.user_id, None);
}

#[tokio::test]
async fn tip_to_unlinked_recipient_creates_one_unclaimed_tip() {
    let (engine, _ledger, db) = tipping_setup().await;

    let reply = engine
        .handle_tip_message(".tip @bob 1", 100, "alice")
        .await
        .unwrap();

    // Activation prompt plus the seeded three-day claim window.
    assert!(reply.contains("activate your account"));
    assert!(reply.contains("3 days to claim"));

    let tips = unclaimed_tips::Entity::find().all(&db).await.unwrap();
    assert_eq!(tips.len(), 1);
    assert_eq!(tips[0].timeout_days, 3);
    assert_eq!(tips[0].recipient_platform_id, 200);
    assert_eq!(tips[0].amount, 100);
    assert_eq!(tips[0].status, TipStatus::Pending.as_str());
}

#[tokio::test]
async fn tip_to_registered_recipient_skips_the_activation_prompt() {
    let (engine, _ledger, db) = tipping_setup().await;

    let bob = engine
        .register_user("bob", "pw", Some((200, "bob")))
        .await
        .unwrap();

    let reply = engine
        .handle_tip_message(".tip @bob 2", 100, "alice")
        .await
        .unwrap();

    assert!(reply.contains("successfully sent"));
    assert!(!reply.contains("activate your account"));
    assert!(unclaimed_tips::Entity::find().all(&db).await.unwrap().is_empty());

    let records = transactions::Entity::find().all(&db).await.unwrap();
    let recipient_leg = records.iter().find(|record| record.amount > 0).unwrap();
    assert_eq!(recipient_leg.user_id.as_deref(), Some(bob.id.as_str()));
}

#[tokio::test]
async fn parse_errors_never_reach_the_ledger() {
    let (engine, ledger, db) = tipping_setup().await;

    let reply = engine
        .handle_tip_message(".tip @bob abc", 100, "alice")
        .await
        .unwrap();
    assert_eq!(reply, "Invalid tip amount.");

    let reply = engine.handle_tip_message(".tip 5", 100, "alice").await.unwrap();
    assert_eq!(reply, "No tip recipient defined.");

    assert!(ledger.transfers().is_empty());
    assert!(transactions::Entity::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn non_command_text_is_ignored() {
    let (engine, _ledger, _db) = tipping_setup().await;

    assert!(
        engine
            .handle_tip_message("thanks for the review!", 100, "alice")
            .await
            .is_none()
    );
}

#[tokio::test]
async fn unresolved_recipient_handle() {
    let (engine, ledger, _db) = tipping_setup().await;

    let reply = engine
        .handle_tip_message(".tip @ghost 1", 100, "alice")
        .await
        .unwrap();
    assert_eq!(reply, "Unable to find user: ghost");
    assert!(ledger.transfers().is_empty());
}

#[tokio::test]
async fn unregistered_sender_gets_an_onboarding_prompt() {
    let (engine, ledger, _db) = tipping_setup().await;

    let reply = engine
        .handle_tip_message(".tip @bob 1", 999, "mallory")
        .await
        .unwrap();
    assert!(reply.contains("@mallory you don't have a tips account set up yet!"));
    assert!(ledger.transfers().is_empty());
}

#[tokio::test]
async fn ledger_rejection_is_surfaced_verbatim() {
    let (engine, ledger, db) = tipping_setup().await;

    let reply = engine
        .handle_tip_message(".tip @bob 500", 100, "alice")
        .await
        .unwrap();
    assert_eq!(reply, "Insufficient funds available.");
    assert!(ledger.transfers().is_empty());
    assert!(transactions::Entity::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn fractional_amounts_round_up_end_to_end() {
    let (engine, ledger, _db) = tipping_setup().await;

    engine
        .handle_tip_message(".tip @bob 1.005", 100, "alice")
        .await
        .unwrap();

    assert_eq!(ledger.transfers(), vec![("acct-1".to_string(), "acct-2".to_string(), 101)]);
}

#[tokio::test]
async fn registration_claims_pending_tips_and_keeps_the_balance() {
    let (engine, ledger, db) = tipping_setup().await;

    engine
        .handle_tip_message(".tip @bob 1", 100, "alice")
        .await
        .unwrap();

    let bob = engine
        .register_user("bob", "pw", Some((200, "bob")))
        .await
        .unwrap();

    // The provisioned account (and its balance) became Bob's primary.
    assert_eq!(bob.primary_account_id.as_deref(), Some("acct-2"));
    assert_eq!(ledger.balance("acct-2"), 100);

    let tips = unclaimed_tips::Entity::find().all(&db).await.unwrap();
    assert_eq!(tips[0].status, TipStatus::Claimed.as_str());
    assert!(tips[0].resolved_at.is_some());
}

#[tokio::test]
async fn expiry_refunds_pending_tips_after_the_window() {
    let (engine, ledger, db) = tipping_setup().await;

    engine
        .handle_tip_message(".tip @bob 1", 100, "alice")
        .await
        .unwrap();

    let tip = unclaimed_tips::Entity::find()
        .one(&db)
        .await
        .unwrap()
        .unwrap();

    // Before the deadline nothing happens.
    engine
        .expire_unclaimed_tips(tip.created_at + Duration::days(2))
        .await
        .unwrap();
    let unchanged = unclaimed_tips::Entity::find().one(&db).await.unwrap().unwrap();
    assert_eq!(unchanged.status, TipStatus::Pending.as_str());

    // After the deadline the balance returns to the sender.
    engine
        .expire_unclaimed_tips(tip.created_at + Duration::days(4))
        .await
        .unwrap();

    let refunded = unclaimed_tips::Entity::find().one(&db).await.unwrap().unwrap();
    assert_eq!(refunded.status, TipStatus::Refunded.as_str());
    assert_eq!(ledger.balance("acct-2"), 0);
    assert_eq!(ledger.balance("acct-1"), 10_000);
}

#[tokio::test]
async fn a_claimed_tip_is_never_refunded() {
    let (engine, ledger, db) = tipping_setup().await;

    engine
        .handle_tip_message(".tip @bob 1", 100, "alice")
        .await
        .unwrap();

    let claimed = engine.claim_unclaimed_tips(200).await.unwrap();
    assert_eq!(claimed, 1);

    let tip = unclaimed_tips::Entity::find().one(&db).await.unwrap().unwrap();
    engine
        .expire_unclaimed_tips(tip.created_at + Duration::days(30))
        .await
        .unwrap();

    let after = unclaimed_tips::Entity::find().one(&db).await.unwrap().unwrap();
    assert_eq!(after.status, TipStatus::Claimed.as_str());
    // The tipped balance stayed put.
    assert_eq!(ledger.balance("acct-2"), 100);

    // And claiming again is a no-op.
    assert_eq!(engine.claim_unclaimed_tips(200).await.unwrap(), 0);
}
