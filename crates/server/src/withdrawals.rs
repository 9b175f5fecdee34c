//! Withdrawal endpoints: prepare (preview) and execute.

use api_types::withdrawal::{
    ExecuteWithdrawal, PrepareWithdrawal, WithdrawalPreviewView, WithdrawalView,
};
use axum::{Extension, Json, extract::State};
use engine::users;

use crate::{ServerError, server::ServerState};

pub async fn prepare(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PrepareWithdrawal>,
) -> Result<Json<WithdrawalPreviewView>, ServerError> {
    let preview = state
        .engine
        .prepare_withdrawal(&user.id, payload.amount, &payload.address)
        .await?;

    Ok(Json(WithdrawalPreviewView {
        id: preview.id,
        account_id: preview.account_id,
        amount: preview.amount,
        fee: preview.fee,
        address: preview.address,
    }))
}

pub async fn execute(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExecuteWithdrawal>,
) -> Result<Json<WithdrawalView>, ServerError> {
    let withdrawal = state
        .engine
        .execute_withdrawal(&user.id, &payload.prepared_id)
        .await?;

    Ok(Json(WithdrawalView {
        id: withdrawal.id,
        account_id: withdrawal.account_id,
        amount: withdrawal.amount,
        fee: withdrawal.fee,
        address: withdrawal.address,
        timestamp: withdrawal.timestamp,
        status: withdrawal.status,
    }))
}
