//! Tip processing, platform sightings and the ledger balance callback.

use api_types::{
    ledger::BalanceCallback,
    platform::Sighting,
    tip::{TipMessage, TipReply},
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::users;

use crate::{ServerError, server::ServerState};

/// Processes a comment from the messaging surface.
///
/// The reply is `None` when the text is not a tip command; otherwise it is
/// the single message to post back to the thread. Pipeline failures are
/// folded into the reply, never into an HTTP error.
pub async fn process(
    Extension(_caller): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TipMessage>,
) -> Result<Json<TipReply>, ServerError> {
    let reply = state
        .engine
        .handle_tip_message(
            &payload.text,
            payload.sender_platform_id,
            &payload.sender_username,
        )
        .await;

    Ok(Json(TipReply { reply }))
}

/// Records a platform-user sighting reported by the bot.
pub async fn seen(
    Extension(_caller): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<Sighting>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .record_platform_user(payload.platform_id, &payload.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Balance-change notification from the ledger service; pulls the account's
/// balance into the local mirror and lets the consolidator react.
pub async fn ledger_callback(
    Extension(_caller): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BalanceCallback>,
) -> Result<StatusCode, ServerError> {
    state.engine.refresh_account(&payload.account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
