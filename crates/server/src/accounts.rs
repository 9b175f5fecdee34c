//! Account linking endpoint.

use api_types::account::{LinkAccount, LinkAccountResponse};
use axum::{Extension, Json, extract::State};
use engine::users;

use crate::{ServerError, server::ServerState};

/// Links an existing ledger account to the authenticated user.
///
/// `linked: false` means the account already belongs to someone; nothing was
/// mutated.
pub async fn link(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<LinkAccount>,
) -> Result<Json<LinkAccountResponse>, ServerError> {
    let account = state
        .engine
        .ledger_account(&payload.account_id)
        .await?;

    let linked = state.engine.link_account(&user.id, &account).await?;
    Ok(Json(LinkAccountResponse { linked }))
}
