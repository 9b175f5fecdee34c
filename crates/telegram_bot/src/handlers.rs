use teloxide::{prelude::*, types::User};

use crate::ConfigParameters;

const HELP_TEXT: &str = "Send `.tip @user <amount>` in any chat I'm in to tip \
another user. Amounts are decimal; fractions round up. Recipients without an \
account get a claim window before the tip is refunded.";

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }

    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let platform_id = platform_id(from);

    // Every author we see becomes a resolvable tip recipient.
    if let Some(username) = from.username.as_deref() {
        if let Err(err) = cfg.api.record_sighting(platform_id, username).await {
            tracing::warn!("failed to record sighting for [{username}]: {err}");
        }
    }

    if text == "/start" || text == "/help" {
        bot.send_message(msg.chat.id, HELP_TEXT).await?;
        return Ok(());
    }

    if !text.starts_with(engine::TIP_COMMAND) {
        return Ok(());
    }

    let sender_username = from
        .username
        .clone()
        .unwrap_or_else(|| from.first_name.clone());

    match cfg.api.send_tip(text, platform_id, &sender_username).await {
        Ok(Some(reply)) => {
            bot.send_message(msg.chat.id, reply).await?;
        }
        Ok(None) => {}
        Err(err) => {
            tracing::error!("tip request failed: {err}");
            bot.send_message(msg.chat.id, "An error occurred, please try again later.")
                .await?;
        }
    }

    Ok(())
}

fn platform_id(user: &User) -> i64 {
    i64::try_from(user.id.0).unwrap_or_default()
}

fn is_allowed(cfg: &ConfigParameters, user: Option<&User>) -> bool {
    match (&cfg.allowed_users, user) {
        (Some(allowed), Some(user)) => allowed.contains(&user.id),
        (Some(_), None) => false,
        (None, _) => true,
    }
}
