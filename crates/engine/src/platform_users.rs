//! Platform users table.
//!
//! Cross-platform identities observed on the messaging surface. The bot
//! records a row for every message author it sees, which is what makes a
//! handle resolvable as a tip recipient later. `account_id` is set when a
//! ledger account is provisioned for the identity (first-contact tip or app
//! registration); until then the identity exists without funds.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "platform_users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub platform_id: i64,
    /// Handle, stored lowercased. Mentions resolve case-insensitively.
    pub username: String,
    pub account_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
