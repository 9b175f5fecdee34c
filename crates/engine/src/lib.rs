//! Account-linking and tip-settlement engine.
//!
//! The engine links app users to accounts held by an external ledger
//! service, keeps exactly one linked account per user designated primary,
//! consolidates balances from secondary accounts into the primary one, and
//! settles peer-to-peer tip commands issued on the messaging surface.
//!
//! Balances are owned by the ledger; the engine mirrors them, reacts to
//! mirror changes through [`EventBus`] events, and corrects itself with a
//! periodic sweep.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use error::EngineError;
pub use events::{EntityEvent, EventBus};
pub use ledger::{
    HttpLedger, LedgerAccount, LedgerError, LedgerService, LedgerTransfer, Withdrawal,
    WithdrawalPreview,
};
pub use service_config::TipConfig;
pub use tips::{TIP_COMMAND, TipCommand, TipParseError, parse_tip_command};
pub use transactions::{Transaction, TransferParty, TransferType};
pub use unclaimed_tips::TipStatus;

pub mod accounts;
pub mod linked_accounts;
pub mod platform_users;
pub mod service_config;
pub mod transactions;
pub mod unclaimed_tips;
pub mod users;

mod error;
mod events;
mod ledger;
mod ops;
mod tips;

type ResultEngine<T> = Result<T, EngineError>;

/// The engine. Cheap to clone; clones share the database connection, the
/// ledger client and the event bus.
#[derive(Clone)]
pub struct Engine {
    database: DatabaseConnection,
    ledger: Arc<dyn LedgerService>,
    events: EventBus,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The event bus carrying entity-change events.
    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    ledger: Option<Arc<dyn LedgerService>>,
    events: Option<EventBus>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the required external ledger client
    pub fn ledger(mut self, ledger: Arc<dyn LedgerService>) -> EngineBuilder {
        self.ledger = Some(ledger);
        self
    }

    /// Override the default event bus (e.g. to share one across engines).
    pub fn events(mut self, events: EventBus) -> EngineBuilder {
        self.events = Some(events);
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Result<Engine, EngineError> {
        let ledger = self.ledger.ok_or_else(|| {
            EngineError::InvalidArgument("a ledger service is required".to_string())
        })?;

        Ok(Engine {
            database: self.database,
            ledger,
            events: self.events.unwrap_or_default(),
        })
    }
}
