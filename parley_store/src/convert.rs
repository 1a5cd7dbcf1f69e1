use parley_core::{ArchivedConversation, ChatMessage, StoreError, UserConversation};
use parley_entities::{archived_conversations, conversations};

pub fn messages_to_json(user_id: i64, messages: &[ChatMessage]) -> Result<String, StoreError> {
    serde_json::to_string(messages).map_err(|source| StoreError::Encoding { user_id, source })
}

pub fn messages_from_json(user_id: i64, json: &str) -> Result<Vec<ChatMessage>, StoreError> {
    serde_json::from_str(json).map_err(|source| StoreError::Encoding { user_id, source })
}

pub fn conversation_from_model(m: conversations::Model) -> Result<UserConversation, StoreError> {
    let messages = messages_from_json(m.user_id, &m.messages)?;

    Ok(UserConversation {
        user_id: m.user_id,
        display_name: m.username,
        messages,
    })
}

pub fn archive_from_model(
    m: archived_conversations::Model,
) -> Result<ArchivedConversation, StoreError> {
    let messages = messages_from_json(m.user_id, &m.messages)?;

    Ok(ArchivedConversation {
        id: m.id,
        user_id: m.user_id,
        display_name: m.username,
        messages,
        archived_at: m.timestamp.and_utc(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_messages_report_the_user() {
        let result = messages_from_json(7, "{not json");
        assert!(matches!(result, Err(StoreError::Encoding { user_id: 7, .. })));
    }

    #[test]
    fn empty_transcript_is_an_empty_array() {
        assert_eq!(messages_to_json(1, &[]).ok().as_deref(), Some("[]"));
    }
}
