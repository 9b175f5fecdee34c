//! Request/response types shared between the HTTP server and its clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterUser {
        pub username: String,
        pub password: String,
        /// Messaging-platform identity to connect at registration time, so
        /// tips received before signing up can be claimed.
        pub platform_id: Option<i64>,
        pub platform_username: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: String,
        pub username: String,
        pub platform_id: Option<i64>,
        pub primary_account_id: Option<String>,
        pub disclaimer_accepted: bool,
    }
}

pub mod platform {
    use super::*;

    /// A message author sighted on the messaging surface.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Sighting {
        pub platform_id: i64,
        pub username: String,
    }
}

pub mod tip {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TipMessage {
        /// Raw comment text; the server decides whether it is a command.
        pub text: String,
        pub sender_platform_id: i64,
        pub sender_username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TipReply {
        /// Reply to post back to the thread; `None` when the text was not a
        /// tip command.
        pub reply: Option<String>,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LinkAccount {
        pub account_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LinkAccountResponse {
        pub linked: bool,
    }
}

pub mod ledger {
    use super::*;

    /// Balance-change notification from the ledger service.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceCallback {
        pub account_id: String,
    }
}

pub mod withdrawal {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PrepareWithdrawal {
        pub amount: i64,
        pub address: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExecuteWithdrawal {
        pub prepared_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawalPreviewView {
        pub id: String,
        pub account_id: String,
        pub amount: i64,
        pub fee: i64,
        pub address: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawalView {
        pub id: String,
        pub account_id: String,
        pub amount: i64,
        pub fee: i64,
        pub address: String,
        pub timestamp: DateTime<Utc>,
        pub status: String,
    }
}
