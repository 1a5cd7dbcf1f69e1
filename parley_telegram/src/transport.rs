use async_trait::async_trait;
use parley_core::Transport;
use teloxide::prelude::*;
use teloxide::types::ChatAction;

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Outbound messages through the Bot API.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            self.bot.send_message(ChatId(chat_id), chunk).await?;
        }
        Ok(())
    }

    async fn send_typing(&self, chat_id: i64) -> anyhow::Result<()> {
        self.bot
            .send_chat_action(ChatId(chat_id), ChatAction::Typing)
            .await?;
        Ok(())
    }
}

/// Split `text` into pieces of at most `limit` characters, on char boundaries.
fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(limit.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_sent_whole() {
        assert_eq!(split_message("hello", 10), vec!["hello".to_string()]);
    }

    #[test]
    fn long_text_is_split_on_char_boundaries() {
        let text = "ä".repeat(9);
        let parts = split_message(&text, 4);

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].chars().count(), 4);
        assert_eq!(parts[2].chars().count(), 1);
        assert_eq!(parts.concat(), text);
    }
}
