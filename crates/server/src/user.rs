//! User registration and consent endpoints.

use api_types::user::{RegisterUser, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::users;

use crate::{ServerError, server::ServerState};

fn view(user: users::Model) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        platform_id: user.platform_id,
        primary_account_id: user.primary_account_id,
        disclaimer_accepted: user.disclaimer_accepted,
    }
}

/// Creates an app user and links their first (primary) account.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterUser>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let platform = match (payload.platform_id, payload.platform_username.as_deref()) {
        (Some(platform_id), Some(platform_username)) => Some((platform_id, platform_username)),
        (None, None) => None,
        _ => {
            return Err(ServerError::Engine(engine::EngineError::InvalidArgument(
                "platform_id and platform_username must be given together".to_string(),
            )));
        }
    };

    let user = state
        .engine
        .register_user(&payload.username, &payload.password, platform)
        .await?;

    Ok((StatusCode::CREATED, Json(view(user))))
}

/// Marks the authenticated user's disclaimer as accepted.
pub async fn consent(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.accept_disclaimer(&user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
