//! Accounts table.
//!
//! Local mirror of external ledger accounts. The ledger is the source of
//! truth; rows here are refreshed from it and only exist to drive the
//! consolidation triggers and to serve reads without a ledger round trip.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub balance_unlocked: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
