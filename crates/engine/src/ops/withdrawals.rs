//! Withdrawals from the user's primary account.
//!
//! Two-step: prepare returns a preview with the fee locked in, execute sends
//! a previously prepared withdrawal. Both operate on the caller's primary
//! linked account only.

use crate::{Engine, EngineError, ResultEngine, Withdrawal, WithdrawalPreview};

impl Engine {
    async fn primary_account_id(&self, user_id: &str) -> ResultEngine<String> {
        let user = self.user(user_id).await?;
        user.primary_account_id.ok_or_else(|| {
            EngineError::PreconditionFailed(format!(
                "user [{user_id}] does not have a primary account"
            ))
        })
    }

    /// Previews a withdrawal from the user's primary account.
    pub async fn prepare_withdrawal(
        &self,
        user_id: &str,
        amount: i64,
        address: &str,
    ) -> ResultEngine<WithdrawalPreview> {
        if amount <= 0 {
            return Err(EngineError::InvalidArgument(
                "amount must be greater than zero".to_string(),
            ));
        }
        if address.is_empty() {
            return Err(EngineError::InvalidArgument(
                "a destination address is required".to_string(),
            ));
        }

        let account_id = self.primary_account_id(user_id).await?;
        Ok(self
            .ledger
            .prepare_withdrawal(&account_id, amount, address)
            .await?)
    }

    /// Executes a previously prepared withdrawal.
    pub async fn execute_withdrawal(
        &self,
        user_id: &str,
        prepared_id: &str,
    ) -> ResultEngine<Withdrawal> {
        if prepared_id.is_empty() {
            return Err(EngineError::InvalidArgument(
                "a prepared withdrawal id is required".to_string(),
            ));
        }

        let account_id = self.primary_account_id(user_id).await?;
        let withdrawal = self
            .ledger
            .execute_withdrawal(&account_id, prepared_id)
            .await?;

        if let Err(err) = self.refresh_account(&account_id).await {
            tracing::warn!("post-withdrawal refresh of [{account_id}] failed: {err}");
        }

        Ok(withdrawal)
    }
}
