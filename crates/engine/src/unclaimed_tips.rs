//! Unclaimed tips table.
//!
//! A tip sent to a recipient with no linked app account is held here pending
//! claim. `status` moves one way only: `pending` to either `claimed`
//! (recipient activated an account) or `refunded` (claim window elapsed,
//! balance returned to the sender). The two terminal states are mutually
//! exclusive; transitions are guarded by conditional updates on `pending`.

use sea_orm::entity::prelude::*;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TipStatus {
    Pending,
    Claimed,
    Refunded,
}

impl TipStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::Refunded => "refunded",
        }
    }
}

impl TryFrom<&str> for TipStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "claimed" => Ok(Self::Claimed),
            "refunded" => Ok(Self::Refunded),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid tip status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "unclaimed_tips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transfer_id: String,
    pub amount: i64,
    pub sender_account_id: String,
    pub recipient_account_id: String,
    pub timeout_days: i32,
    pub sender_username: String,
    pub recipient_username: String,
    pub recipient_platform_id: i64,
    pub created_at: DateTimeUtc,
    pub status: String,
    pub resolved_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
