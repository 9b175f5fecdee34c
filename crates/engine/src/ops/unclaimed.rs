//! Unclaimed-tip lifecycle.
//!
//! Creation happens inside the tip pipeline; claiming happens when the
//! recipient registers; expiry runs on the scheduler. Claim and refund are
//! mutually exclusive terminal states, enforced with conditional updates on
//! `pending` so the two paths cannot both win a race.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveValue, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    Engine, LedgerTransfer, ResultEngine, TipStatus, Transaction, TransferParty, TransferType,
    tips::TipCommand, transactions, unclaimed_tips,
};

impl Engine {
    /// Records a tip held for a recipient who has no linked app account yet.
    /// Pure record creation; the transfer itself already settled.
    pub async fn create_unclaimed_tip(
        &self,
        transfer: &LedgerTransfer,
        command: &TipCommand,
        timeout_days: i32,
        sender_account_id: &str,
        recipient_account_id: &str,
        recipient_platform_id: i64,
    ) -> ResultEngine<unclaimed_tips::Model> {
        let model = unclaimed_tips::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            transfer_id: ActiveValue::Set(transfer.id.clone()),
            amount: ActiveValue::Set(command.amount),
            sender_account_id: ActiveValue::Set(sender_account_id.to_string()),
            recipient_account_id: ActiveValue::Set(recipient_account_id.to_string()),
            timeout_days: ActiveValue::Set(timeout_days),
            sender_username: ActiveValue::Set(command.sender_username.clone()),
            recipient_username: ActiveValue::Set(command.recipient_username.clone()),
            recipient_platform_id: ActiveValue::Set(recipient_platform_id),
            created_at: ActiveValue::Set(transfer.timestamp),
            status: ActiveValue::Set(TipStatus::Pending.as_str().to_string()),
            resolved_at: ActiveValue::Set(None),
        }
        .insert(&self.database)
        .await?;

        Ok(model)
    }

    /// Marks the platform user's pending tips claimed. Returns the number of
    /// tips claimed; claiming is a one-shot transition out of `pending`.
    pub async fn claim_unclaimed_tips(&self, platform_id: i64) -> ResultEngine<u64> {
        let result = unclaimed_tips::Entity::update_many()
            .col_expr(
                unclaimed_tips::Column::Status,
                Expr::value(TipStatus::Claimed.as_str()),
            )
            .col_expr(unclaimed_tips::Column::ResolvedAt, Expr::value(Utc::now()))
            .filter(unclaimed_tips::Column::RecipientPlatformId.eq(platform_id))
            .filter(unclaimed_tips::Column::Status.eq(TipStatus::Pending.as_str()))
            .exec(&self.database)
            .await?;

        Ok(result.rows_affected)
    }

    /// Refunds pending tips whose claim window elapsed before `now`.
    ///
    /// Per-tip failures are logged and retried on the next scheduler period;
    /// they never block other tips.
    pub async fn expire_unclaimed_tips(&self, now: DateTime<Utc>) -> ResultEngine<()> {
        let pending = unclaimed_tips::Entity::find()
            .filter(unclaimed_tips::Column::Status.eq(TipStatus::Pending.as_str()))
            .all(&self.database)
            .await?;

        for tip in pending {
            let deadline = tip.created_at + Duration::days(i64::from(tip.timeout_days));
            if now < deadline {
                continue;
            }

            if let Err(err) = self.refund_unclaimed_tip(&tip).await {
                tracing::error!("refund of unclaimed tip [{}] failed: {err}", tip.id);
            }
        }

        Ok(())
    }

    async fn refund_unclaimed_tip(&self, tip: &unclaimed_tips::Model) -> ResultEngine<()> {
        // Reserve the tip before moving funds so a concurrent claim cannot
        // double-settle it.
        let reserved = unclaimed_tips::Entity::update_many()
            .col_expr(
                unclaimed_tips::Column::Status,
                Expr::value(TipStatus::Refunded.as_str()),
            )
            .col_expr(unclaimed_tips::Column::ResolvedAt, Expr::value(Utc::now()))
            .filter(unclaimed_tips::Column::Id.eq(tip.id.clone()))
            .filter(unclaimed_tips::Column::Status.eq(TipStatus::Pending.as_str()))
            .exec(&self.database)
            .await?;
        if reserved.rows_affected == 0 {
            // Claimed in the meantime.
            return Ok(());
        }

        let transfer = match self
            .ledger
            .transfer(&tip.recipient_account_id, &tip.sender_account_id, tip.amount)
            .await
        {
            Ok(transfer) => transfer,
            Err(err) => {
                // Release the reservation so the next period retries.
                unclaimed_tips::Entity::update_many()
                    .col_expr(
                        unclaimed_tips::Column::Status,
                        Expr::value(TipStatus::Pending.as_str()),
                    )
                    .col_expr(
                        unclaimed_tips::Column::ResolvedAt,
                        Expr::value(Option::<DateTime<Utc>>::None),
                    )
                    .filter(unclaimed_tips::Column::Id.eq(tip.id.clone()))
                    .exec(&self.database)
                    .await?;
                return Err(err.into());
            }
        };

        tracing::info!(
            "refunded unclaimed tip [{}] to @{} (transfer [{}])",
            tip.id,
            tip.sender_username,
            transfer.id
        );

        let sender_user = self.account_owner(&tip.sender_account_id).await?;
        let (refund_leg, return_leg) = Transaction::transfer_pair(
            TransferType::TipRefund,
            &transfer,
            tip.amount,
            TransferParty {
                user_id: None,
                account_id: tip.recipient_account_id.clone(),
                platform_user_id: Some(tip.recipient_platform_id),
            },
            TransferParty {
                user_id: sender_user.map(|user| user.id),
                account_id: tip.sender_account_id.clone(),
                platform_user_id: None,
            },
            &tip.recipient_username,
            &tip.sender_username,
        );

        let (refund_write, return_write, recipient_refresh, sender_refresh) = tokio::join!(
            transactions::ActiveModel::from(&refund_leg).insert(&self.database),
            transactions::ActiveModel::from(&return_leg).insert(&self.database),
            self.refresh_account(&tip.recipient_account_id),
            self.refresh_account(&tip.sender_account_id),
        );
        if let Err(err) = refund_write {
            tracing::error!("failed to record refund leg: {err}");
        }
        if let Err(err) = return_write {
            tracing::error!("failed to record return leg: {err}");
        }
        if let Err(err) = recipient_refresh {
            tracing::error!("failed to refresh recipient account: {err}");
        }
        if let Err(err) = sender_refresh {
            tracing::error!("failed to refresh sender account: {err}");
        }

        Ok(())
    }
}
