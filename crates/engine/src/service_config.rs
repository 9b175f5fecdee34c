//! Service config table.
//!
//! Operational parameters, read-only to the engine and mutated out of band.
//! The single row is loaded into a [`TipConfig`] snapshot at tip-pipeline
//! start and passed down explicitly; nothing reads it ambiently mid-flight.

use sea_orm::entity::prelude::*;

/// Primary key of the single config row.
pub const CONFIG_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "service_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    /// Days an unclaimed tip stays claimable before it is refunded.
    /// Zero disables unclaimed-tip tracking.
    pub tip_timeout_days: i32,
    pub activation_url: String,
    pub ticker: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Immutable snapshot of the config row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TipConfig {
    pub tip_timeout_days: i32,
    pub activation_url: String,
    pub ticker: String,
}

impl From<Model> for TipConfig {
    fn from(model: Model) -> Self {
        Self {
            tip_timeout_days: model.tip_timeout_days,
            activation_url: model.activation_url,
            ticker: model.ticker,
        }
    }
}
