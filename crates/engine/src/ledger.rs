//! Client for the external ledger service.
//!
//! The ledger owns every balance; the engine only mirrors them. The service
//! is reached over HTTP and exposed to the rest of the engine behind the
//! [`LedgerService`] trait so tests can substitute an in-memory fake.
//!
//! Amounts are integers in atomic units. The ledger is not idempotency-aware
//! at this boundary: callers must avoid duplicate submission.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};

/// An account as the ledger reports it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerAccount {
    pub id: String,
    pub balance_unlocked: i64,
    pub balance_locked: i64,
}

/// A settled transfer between two ledger accounts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerTransfer {
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

/// A withdrawal preview: amount and fee locked in, nothing sent yet.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WithdrawalPreview {
    pub id: String,
    pub account_id: String,
    pub amount: i64,
    pub fee: i64,
    pub address: String,
}

/// A withdrawal submitted to the network.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: String,
    pub account_id: String,
    pub amount: i64,
    pub fee: i64,
    pub address: String,
    pub timestamp: DateTime<Utc>,
    pub status: String,
}

/// An error reported by the ledger service.
///
/// Messages are written for end users; the tip pipeline surfaces them
/// verbatim in replies.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct LedgerError {
    pub message: String,
}

impl LedgerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The contract the engine requires from the external ledger.
#[async_trait]
pub trait LedgerService: Send + Sync {
    async fn create_account(&self) -> Result<LedgerAccount, LedgerError>;

    async fn get_account(&self, account_id: &str) -> Result<LedgerAccount, LedgerError>;

    async fn transfer(
        &self,
        from_account_id: &str,
        to_account_id: &str,
        amount: i64,
    ) -> Result<LedgerTransfer, LedgerError>;

    async fn prepare_withdrawal(
        &self,
        account_id: &str,
        amount: i64,
        address: &str,
    ) -> Result<WithdrawalPreview, LedgerError>;

    async fn execute_withdrawal(
        &self,
        account_id: &str,
        prepared_id: &str,
    ) -> Result<Withdrawal, LedgerError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
struct TransferRequest<'a> {
    from: &'a str,
    to: &'a str,
    amount: i64,
}

#[derive(Serialize)]
struct PrepareWithdrawalRequest<'a> {
    amount: i64,
    address: &'a str,
}

#[derive(Serialize)]
struct ExecuteWithdrawalRequest<'a> {
    prepared_id: &'a str,
}

/// HTTP implementation of [`LedgerService`].
#[derive(Clone, Debug)]
pub struct HttpLedger {
    client: Client,
    base_url: String,
}

impl HttpLedger {
    /// Builds a client authenticating with the given API key.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, String> {
        let mut auth = header::HeaderValue::try_from(format!("Bearer {api_key}"))
            .map_err(|err| format!("invalid api key header value: {err}"))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn read_response<T: for<'de> Deserialize<'de>>(
        resp: reqwest::Response,
    ) -> Result<T, LedgerError> {
        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<T>()
                .await
                .map_err(|err| LedgerError::new(format!("invalid ledger response: {err}")));
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => format!("ledger service error ({status})"),
        };
        Err(LedgerError { message })
    }

    async fn post_json<TReq: Serialize + ?Sized, TResp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TResp, LedgerError> {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|err| LedgerError::new(format!("ledger unreachable: {err}")))?;
        Self::read_response(resp).await
    }

    async fn get_json<TResp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
    ) -> Result<TResp, LedgerError> {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|err| LedgerError::new(format!("ledger unreachable: {err}")))?;
        Self::read_response(resp).await
    }
}

#[async_trait]
impl LedgerService for HttpLedger {
    async fn create_account(&self) -> Result<LedgerAccount, LedgerError> {
        self.post_json("/accounts", &()).await
    }

    async fn get_account(&self, account_id: &str) -> Result<LedgerAccount, LedgerError> {
        self.get_json(&format!("/accounts/{account_id}")).await
    }

    async fn transfer(
        &self,
        from_account_id: &str,
        to_account_id: &str,
        amount: i64,
    ) -> Result<LedgerTransfer, LedgerError> {
        self.post_json(
            "/transfers",
            &TransferRequest {
                from: from_account_id,
                to: to_account_id,
                amount,
            },
        )
        .await
    }

    async fn prepare_withdrawal(
        &self,
        account_id: &str,
        amount: i64,
        address: &str,
    ) -> Result<WithdrawalPreview, LedgerError> {
        self.post_json(
            &format!("/accounts/{account_id}/withdrawals/prepare"),
            &PrepareWithdrawalRequest { amount, address },
        )
        .await
    }

    async fn execute_withdrawal(
        &self,
        account_id: &str,
        prepared_id: &str,
    ) -> Result<Withdrawal, LedgerError> {
        self.post_json(
            &format!("/accounts/{account_id}/withdrawals"),
            &ExecuteWithdrawalRequest { prepared_id },
        )
        .await
    }
}
