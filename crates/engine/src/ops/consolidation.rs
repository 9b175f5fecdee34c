//! Balance consolidation.
//!
//! Unlocked balance on non-primary linked accounts is moved to the owner's
//! primary account. The move is triggered reactively by entity-change events
//! and corrected by the periodic sweep. A failed transfer is only logged:
//! the condition that triggers it (positive non-primary mirror) persists, so
//! the next sweep retries naturally.

use sea_orm::{ActiveValue, QueryFilter, prelude::*};
use tokio::sync::broadcast;

use crate::{Engine, EntityEvent, ResultEngine, accounts, linked_accounts};

impl Engine {
    /// Pulls the ledger's balance for an account into the local mirror and
    /// publishes the change.
    pub async fn refresh_account(&self, account_id: &str) -> ResultEngine<()> {
        let account = self.ledger.get_account(account_id).await?;

        let mirror = accounts::ActiveModel {
            id: ActiveValue::Set(account.id.clone()),
            balance_unlocked: ActiveValue::Set(account.balance_unlocked),
        };
        match accounts::Entity::find_by_id(account_id)
            .one(&self.database)
            .await?
        {
            Some(_) => {
                mirror.update(&self.database).await?;
            }
            None => {
                mirror.insert(&self.database).await?;
            }
        }

        self.events.publish(EntityEvent::AccountChanged {
            account_id: account.id,
        });
        Ok(())
    }

    /// Account mirror changed: push the balance into the owning edge, if the
    /// account is linked at all.
    pub async fn on_account_changed(&self, account_id: &str) -> ResultEngine<()> {
        let Some(account) = accounts::Entity::find_by_id(account_id)
            .one(&self.database)
            .await?
        else {
            return Ok(());
        };

        let Some(edge) = linked_accounts::Entity::find_by_id(account_id)
            .one(&self.database)
            .await?
        else {
            return Ok(());
        };

        let user_id = edge.user_id.clone();
        if edge.balance_unlocked != account.balance_unlocked {
            let mut active: linked_accounts::ActiveModel = edge.into();
            active.balance_unlocked = ActiveValue::Set(account.balance_unlocked);
            active.update(&self.database).await?;
        }

        self.events.publish(EntityEvent::LinkedAccountChanged {
            user_id,
            account_id: account_id.to_string(),
        });
        Ok(())
    }

    /// Linked edge changed: consolidate it into the primary account when it
    /// is secondary and holds a positive mirrored balance.
    pub async fn on_linked_account_changed(&self, account_id: &str) -> ResultEngine<()> {
        let Some(edge) = linked_accounts::Entity::find_by_id(account_id)
            .one(&self.database)
            .await?
        else {
            return Ok(());
        };

        self.transfer_balance_to_primary(&edge).await
    }

    /// Periodic correction pass: re-runs consolidation for every non-primary
    /// edge with a positive mirrored balance, one independent task per edge.
    /// A failing task never blocks its siblings.
    pub async fn sweep(&self) -> ResultEngine<()> {
        let edges = linked_accounts::Entity::find()
            .filter(linked_accounts::Column::Primary.eq(false))
            .filter(linked_accounts::Column::BalanceUnlocked.gt(0))
            .all(&self.database)
            .await?;

        if edges.is_empty() {
            return Ok(());
        }

        tracing::info!("sweep: {} edge(s) eligible for consolidation", edges.len());

        let mut tasks = tokio::task::JoinSet::new();
        for edge in edges {
            let engine = self.clone();
            tasks.spawn(async move {
                if let Err(err) = engine.transfer_balance_to_primary(&edge).await {
                    tracing::error!(
                        "sweep task for account [{}] failed: {err}",
                        edge.account_id
                    );
                }
            });
        }
        while tasks.join_next().await.is_some() {}

        Ok(())
    }

    /// Consumes entity-change events and dispatches the consolidation
    /// handlers until the bus closes. Delivery is at-least-once; the
    /// handlers re-read state and are idempotent, and a lagged receiver is
    /// corrected by the next sweep.
    pub async fn run_event_loop(&self) {
        let mut rx = self.events.subscribe();
        loop {
            match rx.recv().await {
                Ok(EntityEvent::AccountChanged { account_id }) => {
                    if let Err(err) = self.on_account_changed(&account_id).await {
                        tracing::error!("account-changed handler for [{account_id}] failed: {err}");
                    }
                }
                Ok(EntityEvent::LinkedAccountChanged { account_id, .. }) => {
                    if let Err(err) = self.on_linked_account_changed(&account_id).await {
                        tracing::error!(
                            "linked-account handler for [{account_id}] failed: {err}"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("event loop lagged, {skipped} event(s) dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Transfers the full unlocked balance of a non-primary edge to the
    /// owner's primary account.
    ///
    /// The local mirror is not zeroed on success: the ledger's own balance
    /// update drives the corrective refresh.
    pub(crate) async fn transfer_balance_to_primary(
        &self,
        edge: &linked_accounts::Model,
    ) -> ResultEngine<()> {
        if edge.primary || edge.balance_unlocked <= 0 {
            return Ok(());
        }

        let Some(primary) = self.linked_account(&edge.user_id, None).await? else {
            tracing::warn!("user [{}] has no primary linked account", edge.user_id);
            return Ok(());
        };

        match self
            .ledger
            .transfer(&edge.account_id, &primary.account_id, edge.balance_unlocked)
            .await
        {
            Ok(transfer) => tracing::info!(
                "consolidated [{}] from account [{}] into primary [{}] (transfer [{}])",
                edge.balance_unlocked,
                edge.account_id,
                primary.account_id,
                transfer.id
            ),
            Err(err) => tracing::error!(
                "consolidation transfer from account [{}] failed: {err}",
                edge.account_id
            ),
        }

        Ok(())
    }
}
