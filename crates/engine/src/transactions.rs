//! Transaction primitives.
//!
//! A `Transaction` is the ledger-visible record of one leg of a transfer.
//! Two-party transfers always produce a pair: the sender leg (negative
//! amount) and the recipient leg (positive amount), sharing the ledger
//! transfer id and timestamp so they can be correlated after the fact. Each
//! leg is filed under the account it belongs to.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ledger::LedgerTransfer};

/// Platform tag written on every transaction record.
pub const PLATFORM: &str = "telegram";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferType {
    Tip,
    TipRefund,
}

impl TransferType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tip => "tip",
            Self::TipRefund => "tip_refund",
        }
    }
}

impl TryFrom<&str> for TransferType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "tip" => Ok(Self::Tip),
            "tip_refund" => Ok(Self::TipRefund),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid transfer type: {other}"
            ))),
        }
    }
}

/// One side of a two-party transfer.
#[derive(Clone, Debug)]
pub struct TransferParty {
    /// Owning app user, when one exists. A provisioned recipient who has not
    /// activated an app account yet has none.
    pub user_id: Option<String>,
    pub account_id: String,
    pub platform_user_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub account_id: String,
    pub platform: String,
    pub platform_user_id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub transfer_type: TransferType,
    /// Signed amount in atomic units: negative on the sender leg, positive
    /// on the recipient leg.
    pub amount: i64,
    pub fee: i64,
    pub status: String,
    pub transfer_id: String,
    pub sender_username: String,
    pub recipient_username: String,
}

impl Transaction {
    /// Builds the two legs of a settled two-party transfer.
    ///
    /// The legs share the transfer's id and timestamp, carry opposite signs,
    /// and sum to zero.
    pub fn transfer_pair(
        transfer_type: TransferType,
        transfer: &LedgerTransfer,
        amount: i64,
        from: TransferParty,
        to: TransferParty,
        sender_username: &str,
        recipient_username: &str,
    ) -> (Transaction, Transaction) {
        let sender_leg = Transaction {
            id: Uuid::new_v4(),
            user_id: from.user_id,
            account_id: from.account_id,
            platform: PLATFORM.to_string(),
            platform_user_id: from.platform_user_id,
            timestamp: transfer.timestamp,
            transfer_type,
            amount: -amount,
            fee: 0,
            status: "completed".to_string(),
            transfer_id: transfer.id.clone(),
            sender_username: sender_username.to_string(),
            recipient_username: recipient_username.to_string(),
        };
        let recipient_leg = Transaction {
            id: Uuid::new_v4(),
            user_id: to.user_id,
            account_id: to.account_id,
            platform: PLATFORM.to_string(),
            platform_user_id: to.platform_user_id,
            timestamp: transfer.timestamp,
            transfer_type,
            amount,
            fee: 0,
            status: "completed".to_string(),
            transfer_id: transfer.id.clone(),
            sender_username: sender_username.to_string(),
            recipient_username: recipient_username.to_string(),
        };
        (sender_leg, recipient_leg)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: Option<String>,
    pub account_id: String,
    pub platform: String,
    pub platform_user_id: Option<i64>,
    pub timestamp: DateTimeUtc,
    pub transfer_type: String,
    pub amount: i64,
    pub fee: i64,
    pub status: String,
    pub transfer_id: String,
    pub sender_username: String,
    pub recipient_username: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            account_id: ActiveValue::Set(tx.account_id.clone()),
            platform: ActiveValue::Set(tx.platform.clone()),
            platform_user_id: ActiveValue::Set(tx.platform_user_id),
            timestamp: ActiveValue::Set(tx.timestamp),
            transfer_type: ActiveValue::Set(tx.transfer_type.as_str().to_string()),
            amount: ActiveValue::Set(tx.amount),
            fee: ActiveValue::Set(tx.fee),
            status: ActiveValue::Set(tx.status.clone()),
            transfer_id: ActiveValue::Set(tx.transfer_id.clone()),
            sender_username: ActiveValue::Set(tx.sender_username.clone()),
            recipient_username: ActiveValue::Set(tx.recipient_username.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound(format!("transaction [{}]", model.id)))?,
            user_id: model.user_id,
            account_id: model.account_id,
            platform: model.platform,
            platform_user_id: model.platform_user_id,
            timestamp: model.timestamp,
            transfer_type: TransferType::try_from(model.transfer_type.as_str())?,
            amount: model.amount,
            fee: model.fee,
            status: model.status,
            transfer_id: model.transfer_id,
            sender_username: model.sender_username,
            recipient_username: model.recipient_username,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn transfer_pair_legs_correlate_and_sum_to_zero() {
        let transfer = LedgerTransfer {
            id: "tr-1".to_string(),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        let (sender_leg, recipient_leg) = Transaction::transfer_pair(
            TransferType::Tip,
            &transfer,
            500,
            TransferParty {
                user_id: Some("u-alice".to_string()),
                account_id: "acct-a".to_string(),
                platform_user_id: Some(100),
            },
            TransferParty {
                user_id: None,
                account_id: "acct-b".to_string(),
                platform_user_id: Some(200),
            },
            "alice",
            "bob",
        );

        assert_eq!(sender_leg.amount, -500);
        assert_eq!(recipient_leg.amount, 500);
        assert_eq!(sender_leg.amount + recipient_leg.amount, 0);
        assert_eq!(sender_leg.transfer_id, recipient_leg.transfer_id);
        assert_eq!(sender_leg.timestamp, recipient_leg.timestamp);
        assert_eq!(sender_leg.account_id, "acct-a");
        assert_eq!(recipient_leg.account_id, "acct-b");
        assert_ne!(sender_leg.id, recipient_leg.id);
    }
}
