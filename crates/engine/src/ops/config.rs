//! Operational config access.

use sea_orm::prelude::*;

use crate::{Engine, EngineError, ResultEngine, TipConfig, service_config};

impl Engine {
    /// Loads the operational config snapshot.
    ///
    /// Loaded once at tip-pipeline start and passed down explicitly; the
    /// row itself is mutated out of band.
    pub async fn tip_config(&self) -> ResultEngine<TipConfig> {
        let model = service_config::Entity::find_by_id(service_config::CONFIG_ID)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("service config".to_string()))?;

        Ok(TipConfig::from(model))
    }
}
