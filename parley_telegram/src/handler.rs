use crate::{Result, TelegramBot};
use parley_conversation::InboundMessage;
use teloxide::types::Message;
use tracing::debug;

/// Name shown in logs and stored with the conversation.
fn display_name(username: Option<&str>, first_name: &str) -> String {
    username
        .filter(|name| !name.is_empty())
        .or_else(|| Some(first_name).filter(|name| !name.is_empty()))
        .unwrap_or("Unknown")
        .to_string()
}

/// Map a Telegram message to an inbound event. Messages without text or
/// without a sender are not conversation input.
fn inbound_from_message(msg: &Message) -> Option<InboundMessage> {
    let text = msg.text()?;
    let user = msg.from.as_ref()?;
    let sender_id = i64::try_from(user.id.0).ok()?;

    Some(InboundMessage {
        sender_id,
        sender_name: display_name(user.username.as_deref(), &user.first_name),
        chat_id: msg.chat.id.0,
        text: text.to_string(),
    })
}

/// Handle any message (commands or regular text)
pub async fn handle_message(bot: TelegramBot, msg: Message) -> Result<()> {
    let Some(event) = inbound_from_message(&msg) else {
        debug!("Ignoring non-text message in chat {}", msg.chat.id);
        return Ok(());
    };

    bot.sessions.handle(&event).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_preferred() {
        assert_eq!(display_name(Some("alice_w"), "Alice"), "alice_w");
    }

    #[test]
    fn first_name_is_the_fallback() {
        assert_eq!(display_name(None, "Alice"), "Alice");
        assert_eq!(display_name(Some(""), "Alice"), "Alice");
    }

    #[test]
    fn unknown_when_nothing_is_set() {
        assert_eq!(display_name(None, ""), "Unknown");
    }
}
