//! Linked accounts table.
//!
//! The edge between a user and an external ledger account. The primary key
//! on `account_id` makes "an account is linked to at most one user" a schema
//! guarantee; "exactly one primary edge per user" is established atomically
//! at link time and never contested afterwards (no code path re-elects a
//! primary).

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "linked_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: String,
    pub user_id: String,
    pub primary: bool,
    /// Mirror of the account's unlocked balance, kept current by the
    /// consolidation handlers. Never authoritative.
    pub balance_unlocked: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
