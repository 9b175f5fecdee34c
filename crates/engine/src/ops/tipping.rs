//! Tip command resolution and settlement.
//!
//! The pipeline's contract with the messaging surface: every recognized
//! command produces exactly one reply string, whatever happens. Failures
//! short-circuit with a message describing the problem in plain language;
//! only "not a command at all" produces no reply.

use sea_orm::prelude::*;

use crate::{
    Engine, TipConfig, Transaction, TransferParty, TransferType, tips, tips::TipCommand,
    transactions,
};

const REPLY_RETRY_LATER: &str = "An error occurred, please try again later.";

fn format_amount(atomic: i64) -> String {
    format!("{:.2}", atomic as f64 / 100.0)
}

fn unlinked_sender_reply(sender_username: &str, activation_url: &str) -> String {
    format!(
        "@{sender_username} you don't have a tips account set up yet! Visit {activation_url} to get started."
    )
}

impl Engine {
    /// Handles a raw comment from the messaging surface.
    ///
    /// Returns `None` when the text is not a tip command (most messages are
    /// not), otherwise the reply to post back to the thread.
    pub async fn handle_tip_message(
        &self,
        text: &str,
        sender_platform_id: i64,
        sender_username: &str,
    ) -> Option<String> {
        let parsed = tips::parse_tip_command(text, sender_platform_id, sender_username)?;

        let command = match parsed {
            Ok(command) => command,
            Err(err) => {
                tracing::info!("invalid tip command from [{sender_username}]: {err}");
                return Some(err.to_string());
            }
        };

        // Config snapshot is taken once per invocation and injected into the
        // pipeline; a load failure aborts before any resolution work.
        let config = match self.tip_config().await {
            Ok(config) => config,
            Err(err) => {
                tracing::error!("failed to load service config: {err}");
                return Some(REPLY_RETRY_LATER.to_string());
            }
        };

        tracing::info!(
            "processing tip command: {} -> @{} ({})",
            command.sender_username,
            command.recipient_username,
            command.amount
        );
        Some(self.process_tip_command(&command, &config).await)
    }

    /// Runs the resolution and settlement pipeline for a parsed command.
    pub async fn process_tip_command(&self, command: &TipCommand, config: &TipConfig) -> String {
        // Sender must already be an app user with a linked account.
        let sender = match self.user_by_platform_id(command.sender_platform_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return unlinked_sender_reply(&command.sender_username, &config.activation_url);
            }
            Err(err) => {
                tracing::error!("sender lookup failed: {err}");
                return REPLY_RETRY_LATER.to_string();
            }
        };

        // Recipient handle must name a sighted platform identity.
        let recipient_platform = match self.resolve_platform_user(&command.recipient_username).await
        {
            Ok(identity) => identity,
            Err(crate::EngineError::NotFound(_)) => {
                return format!("Unable to find user: {}", command.recipient_username);
            }
            Err(err) => {
                tracing::error!("recipient lookup failed: {err}");
                return REPLY_RETRY_LATER.to_string();
            }
        };

        // Sender's ledger account via their primary linked edge.
        let sender_account_id = match self.linked_account(&sender.id, None).await {
            Ok(Some(edge)) => edge.account_id,
            Ok(None) => {
                return unlinked_sender_reply(&command.sender_username, &config.activation_url);
            }
            Err(err) => {
                tracing::error!("sender linked-account lookup failed: {err}");
                return REPLY_RETRY_LATER.to_string();
            }
        };

        // Recipient's ledger account, provisioned on first contact.
        let recipient_account_id = match recipient_platform.account_id.clone() {
            Some(account_id) => account_id,
            None => match self
                .provision_platform_account(recipient_platform.platform_id)
                .await
            {
                Ok(account) => account.id,
                Err(err) => {
                    tracing::error!(
                        "failed to provision account for [{}]: {err}",
                        command.recipient_username
                    );
                    return format!(
                        "Failed to get tips account for user {}.",
                        command.recipient_username
                    );
                }
            },
        };

        // Settle on the external ledger. Its error messages are written for
        // end users and are surfaced verbatim.
        let transfer = match self
            .ledger
            .transfer(&sender_account_id, &recipient_account_id, command.amount)
            .await
        {
            Ok(transfer) => transfer,
            Err(err) => return err.to_string(),
        };

        // Paired transaction records plus both mirror refreshes are mutually
        // independent; the transfer already settled, so individual write
        // failures are logged without suppressing the success reply.
        let recipient_user = match self.account_owner(&recipient_account_id).await {
            Ok(owner) => owner,
            Err(err) => {
                tracing::error!("recipient owner lookup failed: {err}");
                None
            }
        };

        let (sender_leg, recipient_leg) = Transaction::transfer_pair(
            TransferType::Tip,
            &transfer,
            command.amount,
            TransferParty {
                user_id: Some(sender.id.clone()),
                account_id: sender_account_id.clone(),
                platform_user_id: Some(command.sender_platform_id),
            },
            TransferParty {
                user_id: recipient_user.as_ref().map(|user| user.id.clone()),
                account_id: recipient_account_id.clone(),
                platform_user_id: Some(recipient_platform.platform_id),
            },
            &command.sender_username,
            &command.recipient_username,
        );

        let (sender_write, recipient_write, sender_refresh, recipient_refresh) = tokio::join!(
            transactions::ActiveModel::from(&sender_leg).insert(&self.database),
            transactions::ActiveModel::from(&recipient_leg).insert(&self.database),
            self.refresh_account(&sender_account_id),
            self.refresh_account(&recipient_account_id),
        );
        if let Err(err) = sender_write {
            tracing::error!("failed to record sender transaction: {err}");
        }
        if let Err(err) = recipient_write {
            tracing::error!("failed to record recipient transaction: {err}");
        }
        if let Err(err) = sender_refresh {
            tracing::error!("failed to refresh sender account: {err}");
        }
        if let Err(err) = recipient_refresh {
            tracing::error!("failed to refresh recipient account: {err}");
        }

        let mut reply = format!(
            "`{} {}` tip successfully sent to @{}! Visit {} to manage your tips.",
            format_amount(command.amount),
            config.ticker,
            command.recipient_username,
            config.activation_url
        );

        if recipient_user.is_none() {
            reply.push_str(&format!(
                "\n\n@{} you have not linked a tips account yet, visit {} to activate your account.",
                command.recipient_username, config.activation_url
            ));

            if config.tip_timeout_days > 0 {
                match self
                    .create_unclaimed_tip(
                        &transfer,
                        command,
                        config.tip_timeout_days,
                        &sender_account_id,
                        &recipient_account_id,
                        recipient_platform.platform_id,
                    )
                    .await
                {
                    Ok(tip) => reply.push_str(&format!(
                        " You have {} days to claim your tip before @{} is refunded!",
                        tip.timeout_days, command.sender_username
                    )),
                    Err(err) => tracing::error!("failed to record unclaimed tip: {err}"),
                }
            }
        }

        reply
    }
}
