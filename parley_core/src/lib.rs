#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod error;

pub use error::StoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Reserved for a configured system prompt; never persisted.
    System,
}

/// One role-tagged turn of a conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> anyhow::Result<LLMResponse>;
}

/// The live conversation of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserConversation {
    pub user_id: i64,
    /// Refreshed on every load so renames are tracked.
    pub display_name: String,
    pub messages: Vec<ChatMessage>,
}

impl UserConversation {
    #[must_use]
    pub fn new(user_id: i64, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            messages: Vec::new(),
        }
    }
}

/// Immutable snapshot of a conversation taken when the user resets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedConversation {
    pub id: Uuid,
    pub user_id: i64,
    pub display_name: String,
    pub messages: Vec<ChatMessage>,
    pub archived_at: DateTime<Utc>,
}

/// Durable per-user conversation state plus the write-only archive.
///
/// Implementations own every read and write of persisted records. Callers
/// are expected to serialize operations for a single user; writes are
/// last-writer-wins.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Fetch the user's record, creating an empty one if absent. An existing
    /// record has its display name overwritten with `display_name`.
    async fn load_or_create(
        &self,
        user_id: i64,
        display_name: &str,
    ) -> Result<UserConversation, StoreError>;

    /// Overwrite the user's active transcript.
    async fn replace_messages(&self, user_id: i64, messages: &[ChatMessage])
    -> Result<(), StoreError>;

    /// Append an archive record for `messages`. Empty transcripts are not
    /// archived.
    async fn archive(
        &self,
        user_id: i64,
        display_name: &str,
        messages: &[ChatMessage],
    ) -> Result<(), StoreError>;
}

/// Outbound half of the messaging platform.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;

    /// Show a "typing" presence indicator in the chat.
    async fn send_typing(&self, chat_id: i64) -> anyhow::Result<()>;
}
