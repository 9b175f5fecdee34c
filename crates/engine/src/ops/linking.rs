//! Linked-account registry: the user/account edges and the primary
//! designation invariant.

use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    Engine, EntityEvent, LedgerAccount, ResultEngine, linked_accounts, users,
};

impl Engine {
    /// Links a ledger account to a user.
    ///
    /// Returns `Ok(false)` without mutating anything when the account id is
    /// already linked to any user. The edge becomes primary iff the user has
    /// no linked accounts yet; the edge insert and the user's
    /// `primary_account_id` update commit in the same database transaction,
    /// so a failure leaves neither behind and two concurrent first links
    /// cannot both observe zero edges.
    pub async fn link_account(&self, user_id: &str, account: &LedgerAccount) -> ResultEngine<bool> {
        let db_tx = self.database.begin().await?;

        if let Some(existing) = linked_accounts::Entity::find_by_id(&account.id)
            .one(&db_tx)
            .await?
        {
            tracing::warn!(
                "account [{}] is already linked to user [{}]",
                account.id,
                existing.user_id
            );
            return Ok(false);
        }

        let has_primary = linked_accounts::Entity::find()
            .filter(linked_accounts::Column::UserId.eq(user_id))
            .filter(linked_accounts::Column::Primary.eq(true))
            .one(&db_tx)
            .await?
            .is_some();
        let primary = !has_primary;

        linked_accounts::ActiveModel {
            account_id: ActiveValue::Set(account.id.clone()),
            user_id: ActiveValue::Set(user_id.to_string()),
            primary: ActiveValue::Set(primary),
            balance_unlocked: ActiveValue::Set(account.balance_unlocked),
        }
        .insert(&db_tx)
        .await?;

        if primary {
            users::ActiveModel {
                id: ActiveValue::Set(user_id.to_string()),
                primary_account_id: ActiveValue::Set(Some(account.id.clone())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
        }

        db_tx.commit().await?;

        tracing::info!(
            "linked account [{}] to user [{user_id}] (primary: {primary})",
            account.id
        );
        self.events.publish(EntityEvent::LinkedAccountChanged {
            user_id: user_id.to_string(),
            account_id: account.id.clone(),
        });

        Ok(true)
    }

    /// Returns one of the user's linked edges: the one matching `account_id`,
    /// or the primary edge when `account_id` is `None`.
    pub async fn linked_account(
        &self,
        user_id: &str,
        account_id: Option<&str>,
    ) -> ResultEngine<Option<linked_accounts::Model>> {
        let mut query =
            linked_accounts::Entity::find().filter(linked_accounts::Column::UserId.eq(user_id));

        query = match account_id {
            Some(account_id) => query.filter(linked_accounts::Column::AccountId.eq(account_id)),
            None => query.filter(linked_accounts::Column::Primary.eq(true)),
        };

        Ok(query.one(&self.database).await?)
    }

    /// Reverse lookup: the user owning a linked account, if any.
    pub async fn account_owner(&self, account_id: &str) -> ResultEngine<Option<users::Model>> {
        let Some(edge) = linked_accounts::Entity::find_by_id(account_id)
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(self.user(&edge.user_id).await?))
    }
}
