#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use engine::{
    Engine, LedgerAccount, LedgerError, LedgerService, LedgerTransfer, Withdrawal,
    WithdrawalPreview,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Default)]
struct MockState {
    balances: HashMap<String, i64>,
    accounts_created: u32,
    transfers: Vec<(String, String, i64)>,
    fail_transfers_from: HashSet<String>,
}

/// In-memory stand-in for the external ledger service.
///
/// Balances move synchronously; `deposit` simulates funds arriving from
/// outside the system.
pub struct MockLedger {
    state: Mutex<MockState>,
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MockState::default()),
        })
    }

    /// Credits an account out of band, as a deposit from the wider network.
    pub fn deposit(&self, account_id: &str, amount: i64) {
        let mut state = self.state.lock().unwrap();
        *state.balances.entry(account_id.to_string()).or_insert(0) += amount;
    }

    pub fn balance(&self, account_id: &str) -> i64 {
        let state = self.state.lock().unwrap();
        state.balances.get(account_id).copied().unwrap_or(0)
    }

    pub fn transfers(&self) -> Vec<(String, String, i64)> {
        self.state.lock().unwrap().transfers.clone()
    }

    /// Makes every transfer out of the given account fail.
    pub fn fail_transfers_from(&self, account_id: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_transfers_from
            .insert(account_id.to_string());
    }
}

#[async_trait]
impl LedgerService for MockLedger {
    async fn create_account(&self) -> Result<LedgerAccount, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.accounts_created += 1;
        let id = format!("acct-{}", state.accounts_created);
        state.balances.insert(id.clone(), 0);
        Ok(LedgerAccount {
            id,
            balance_unlocked: 0,
            balance_locked: 0,
        })
    }

    async fn get_account(&self, account_id: &str) -> Result<LedgerAccount, LedgerError> {
        let state = self.state.lock().unwrap();
        let balance = state
            .balances
            .get(account_id)
            .copied()
            .ok_or_else(|| LedgerError::new("Account not found."))?;
        Ok(LedgerAccount {
            id: account_id.to_string(),
            balance_unlocked: balance,
            balance_locked: 0,
        })
    }

    async fn transfer(
        &self,
        from_account_id: &str,
        to_account_id: &str,
        amount: i64,
    ) -> Result<LedgerTransfer, LedgerError> {
        let mut state = self.state.lock().unwrap();

        if state.fail_transfers_from.contains(from_account_id) {
            return Err(LedgerError::new("Transfer failed, please try again later."));
        }

        let from_balance = state.balances.get(from_account_id).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(LedgerError::new("Insufficient funds available."));
        }

        *state
            .balances
            .entry(from_account_id.to_string())
            .or_insert(0) -= amount;
        *state.balances.entry(to_account_id.to_string()).or_insert(0) += amount;
        state
            .transfers
            .push((from_account_id.to_string(), to_account_id.to_string(), amount));

        let n = state.transfers.len() as i64;
        Ok(LedgerTransfer {
            id: format!("tr-{n}"),
            timestamp: Utc.timestamp_opt(1_700_000_000 + n, 0).unwrap(),
        })
    }

    async fn prepare_withdrawal(
        &self,
        account_id: &str,
        amount: i64,
        address: &str,
    ) -> Result<WithdrawalPreview, LedgerError> {
        let state = self.state.lock().unwrap();
        let balance = state.balances.get(account_id).copied().unwrap_or(0);
        if balance < amount {
            return Err(LedgerError::new("Insufficient funds available."));
        }
        Ok(WithdrawalPreview {
            id: format!("prep-{account_id}"),
            account_id: account_id.to_string(),
            amount,
            fee: 10,
            address: address.to_string(),
        })
    }

    async fn execute_withdrawal(
        &self,
        account_id: &str,
        prepared_id: &str,
    ) -> Result<Withdrawal, LedgerError> {
        Ok(Withdrawal {
            id: format!("wd-{prepared_id}"),
            account_id: account_id.to_string(),
            amount: 100,
            fee: 10,
            address: "addr".to_string(),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            status: "pending".to_string(),
        })
    }
}

/// Fresh engine over an in-memory database and a mock ledger.
pub async fn setup() -> (Engine, Arc<MockLedger>, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let ledger = MockLedger::new();
    let engine = Engine::builder()
        .database(db.clone())
        .ledger(ledger.clone())
        .build()
        .unwrap();

    (engine, ledger, db)
}
