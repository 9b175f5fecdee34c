//! Tip command parsing.
//!
//! A tip command is free text posted on the messaging surface:
//! it starts with the `.tip ` token, mentions exactly one recipient
//! (`@handle`), and carries a decimal amount. Anything not starting with the
//! command token is simply not a command and is ignored without error.

/// The literal command token, including the trailing space.
pub const TIP_COMMAND: &str = ".tip ";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TipCommand {
    pub sender_platform_id: i64,
    pub sender_username: String,
    pub recipient_username: String,
    /// Amount in atomic units (hundredths), ceiling-rounded.
    pub amount: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TipParseError {
    #[error("No tip recipient defined.")]
    NoRecipient,
    #[error("Invalid tip amount.")]
    InvalidAmount,
}

/// Parses a comment into a tip command.
///
/// Returns `None` when the text does not start with the command token (most
/// comments are not commands). The first mention is the recipient; the first
/// non-mention token after the command token is the amount, so both
/// `.tip @bob 1` and `.tip 1 @bob` parse.
pub fn parse_tip_command(
    text: &str,
    sender_platform_id: i64,
    sender_username: &str,
) -> Option<Result<TipCommand, TipParseError>> {
    let rest = text.strip_prefix(TIP_COMMAND)?;

    let mentions = mentions(rest);
    let Some(recipient_username) = mentions.into_iter().next() else {
        return Some(Err(TipParseError::NoRecipient));
    };

    let Some(amount) = tip_amount(rest) else {
        return Some(Err(TipParseError::InvalidAmount));
    };

    Some(Ok(TipCommand {
        sender_platform_id,
        sender_username: sender_username.to_string(),
        recipient_username,
        amount,
    }))
}

/// Extracts `@mention` handles: an `@` not preceded by a word character,
/// followed by letters, digits, `_` or `-`.
fn mentions(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut prev_is_word = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '@' && !prev_is_word {
            let mut handle = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' || next == '-' {
                    handle.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            if handle.is_empty() {
                prev_is_word = false;
            } else {
                // The handle's last char is a word char or '-'; only the
                // former blocks a directly following '@'.
                prev_is_word = handle
                    .chars()
                    .next_back()
                    .is_some_and(|last| last.is_ascii_alphanumeric() || last == '_');
                found.push(handle);
                continue;
            }
        } else {
            prev_is_word = c.is_ascii_alphanumeric() || c == '_';
        }
    }

    found
}

/// Parses the amount: the first non-mention token, scaled to atomic units
/// with ceiling rounding (the sender absorbs fractional hundredths).
fn tip_amount(text: &str) -> Option<i64> {
    let token = text
        .split_whitespace()
        .find(|token| !token.starts_with('@'))?;

    let value: f64 = token.parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    let atomic = (value * 100.0).ceil();
    if atomic > i64::MAX as f64 {
        return None;
    }

    Some(atomic as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<Result<TipCommand, TipParseError>> {
        parse_tip_command(text, 100, "alice")
    }

    #[test]
    fn whole_amount_in_atomic_units() {
        let command = parse(".tip @bob 1").unwrap().unwrap();
        assert_eq!(command.recipient_username, "bob");
        assert_eq!(command.amount, 100);
    }

    #[test]
    fn fractional_amount_rounds_up() {
        let command = parse(".tip @bob 1.005").unwrap().unwrap();
        assert_eq!(command.amount, 101);
    }

    #[test]
    fn amount_before_mention() {
        let command = parse(".tip 5 @bob").unwrap().unwrap();
        assert_eq!(command.recipient_username, "bob");
        assert_eq!(command.amount, 500);
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        let err = parse(".tip @bob abc").unwrap().unwrap_err();
        assert_eq!(err, TipParseError::InvalidAmount);
    }

    #[test]
    fn missing_mention_is_rejected() {
        let err = parse(".tip 5").unwrap().unwrap_err();
        assert_eq!(err, TipParseError::NoRecipient);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let err = parse(".tip @bob -5").unwrap().unwrap_err();
        assert_eq!(err, TipParseError::InvalidAmount);
    }

    #[test]
    fn non_command_text_is_ignored() {
        assert!(parse("thanks @bob, great patch!").is_none());
        assert!(parse(".tipping culture").is_none());
        assert!(parse(".tip").is_none());
    }

    #[test]
    fn first_mention_wins() {
        let command = parse(".tip @bob 2 thanks @carol").unwrap().unwrap();
        assert_eq!(command.recipient_username, "bob");
    }

    #[test]
    fn email_address_is_not_a_mention() {
        let err = parse(".tip 5 to alice@example.com").unwrap().unwrap_err();
        assert_eq!(err, TipParseError::NoRecipient);
    }

    #[test]
    fn handles_allow_hyphen_and_underscore() {
        let command = parse(".tip @bob-the_builder 3").unwrap().unwrap();
        assert_eq!(command.recipient_username, "bob-the_builder");
    }

    #[test]
    fn sender_identity_is_carried() {
        let command = parse_tip_command(".tip @bob 1", 42, "carol")
            .unwrap()
            .unwrap();
        assert_eq!(command.sender_platform_id, 42);
        assert_eq!(command.sender_username, "carol");
    }
}
