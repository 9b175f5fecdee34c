//! Users table.
//!
//! An app identity. `platform_id` is the messaging-platform numeric id once
//! the user has connected one; `primary_account_id` mirrors the account id of
//! the user's primary linked edge and stays `NULL` until the first link.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub username: String,
    pub password: String,
    pub platform_id: Option<i64>,
    pub primary_account_id: Option<String>,
    pub disclaimer_accepted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::linked_accounts::Entity")]
    LinkedAccounts,
}

impl Related<super::linked_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LinkedAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
