use std::time::Duration;

use engine::LedgerService;

mod common;

/// Registers a user and links a second (secondary) account holding `amount`.
async fn user_with_funded_secondary(
    engine: &engine::Engine,
    ledger: &common::MockLedger,
    username: &str,
    amount: i64,
) -> (String, String) {
    let user = engine.register_user(username, "pw", None).await.unwrap();
    let primary_id = user.primary_account_id.expect("no primary account");

    let secondary = ledger.create_account().await.unwrap();
    ledger.deposit(&secondary.id, amount);
    // Re-read so the edge mirror starts at the funded balance.
    let secondary = ledger.get_account(&secondary.id).await.unwrap();
    assert!(engine.link_account(&user.id, &secondary).await.unwrap());

    (primary_id, secondary.id)
}

#[tokio::test]
async fn account_change_updates_the_edge_mirror() {
    let (engine, ledger, _db) = common::setup().await;

    let user = engine.register_user("alice", "pw", None).await.unwrap();
    let secondary = ledger.create_account().await.unwrap();
    engine.link_account(&user.id, &secondary).await.unwrap();

    ledger.deposit(&secondary.id, 700);
    engine.refresh_account(&secondary.id).await.unwrap();
    engine.on_account_changed(&secondary.id).await.unwrap();

    let edge = engine
        .linked_account(&user.id, Some(&secondary.id))
        .await
        .unwrap()
        .expect("secondary edge missing");
    assert_eq!(edge.balance_unlocked, 700);
}

#[tokio::test]
async fn refreshing_an_unlinked_account_is_a_no_op() {
    let (engine, ledger, _db) = common::setup().await;

    let orphan = ledger.create_account().await.unwrap();
    ledger.deposit(&orphan.id, 500);

    engine.refresh_account(&orphan.id).await.unwrap();
    engine.on_account_changed(&orphan.id).await.unwrap();
    engine.on_linked_account_changed(&orphan.id).await.unwrap();

    assert!(ledger.transfers().is_empty());
}

#[tokio::test]
async fn secondary_balance_moves_to_the_primary_account() {
    let (engine, ledger, _db) = common::setup().await;

    let (primary_id, secondary_id) =
        user_with_funded_secondary(&engine, &ledger, "alice", 900).await;

    engine.on_linked_account_changed(&secondary_id).await.unwrap();

    assert_eq!(
        ledger.transfers(),
        vec![(secondary_id.clone(), primary_id.clone(), 900)]
    );
    assert_eq!(ledger.balance(&primary_id), 900);
    assert_eq!(ledger.balance(&secondary_id), 0);
}

#[tokio::test]
async fn primary_edges_never_consolidate() {
    let (engine, ledger, _db) = common::setup().await;

    let user = engine.register_user("alice", "pw", None).await.unwrap();
    let primary_id = user.primary_account_id.unwrap();
    ledger.deposit(&primary_id, 800);
    engine.refresh_account(&primary_id).await.unwrap();
    engine.on_account_changed(&primary_id).await.unwrap();
    engine.on_linked_account_changed(&primary_id).await.unwrap();

    assert!(ledger.transfers().is_empty());
}

#[tokio::test]
async fn the_event_loop_drives_consolidation_end_to_end() {
    let (engine, ledger, _db) = common::setup().await;

    let (primary_id, secondary_id) =
        user_with_funded_secondary(&engine, &ledger, "alice", 300).await;

    let loop_engine = engine.clone();
    let event_loop = tokio::spawn(async move {
        loop_engine.run_event_loop().await;
    });

    // A balance notification from the ledger kicks off the chain:
    // refresh -> edge mirror update -> consolidation transfer.
    engine.refresh_account(&secondary_id).await.unwrap();

    let mut consolidated = false;
    for _ in 0..100 {
        if !ledger.transfers().is_empty() {
            consolidated = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    event_loop.abort();

    assert!(consolidated, "event loop never ran the consolidation transfer");
    assert_eq!(ledger.balance(&primary_id), 300);
}

#[tokio::test]
async fn sweep_failure_in_one_task_does_not_block_the_others() {
    let (engine, ledger, _db) = common::setup().await;

    let (_alice_primary, alice_secondary) =
        user_with_funded_secondary(&engine, &ledger, "alice", 400).await;
    let (bob_primary, bob_secondary) =
        user_with_funded_secondary(&engine, &ledger, "bob", 600).await;

    ledger.fail_transfers_from(&alice_secondary);

    engine.sweep().await.unwrap();

    assert_eq!(
        ledger.transfers(),
        vec![(bob_secondary.clone(), bob_primary.clone(), 600)]
    );
    assert_eq!(ledger.balance(&bob_primary), 600);
    // Alice's balance stays where it was; the next sweep retries it.
    assert_eq!(ledger.balance(&alice_secondary), 400);
}

#[tokio::test]
async fn sweep_is_idempotent_once_the_mirror_catches_up() {
    let (engine, ledger, _db) = common::setup().await;

    let (_primary_id, secondary_id) =
        user_with_funded_secondary(&engine, &ledger, "alice", 250).await;

    engine.sweep().await.unwrap();
    assert_eq!(ledger.transfers().len(), 1);

    // The ledger's balance update drives the corrective mirror refresh.
    engine.refresh_account(&secondary_id).await.unwrap();
    engine.on_account_changed(&secondary_id).await.unwrap();

    engine.sweep().await.unwrap();
    assert_eq!(ledger.transfers().len(), 1, "second sweep must be a no-op");
}
