//! Orchestration of one inbound message.
//!
//! The `SessionManager` applies the rate limiter, reads and writes the
//! user's history through the [`HistoryStore`], calls the completion service
//! and emits the reply through the [`Transport`].

use parley_core::{ChatMessage, HistoryStore, LLMProvider, Transport};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::command::{COMMAND_MARKER, Command, Inbound};
use crate::error::{CompletionError, ConversationError};
use crate::locks::UserLocks;
use crate::rate_limiter::RateLimiter;

pub const THROTTLED_TEXT: &str = "⚠️ Please wait a moment before sending another message.";

pub const APOLOGY_TEXT: &str =
    "Sorry, I encountered an issue while processing your request. Please try again later.";

pub const RESET_TEXT: &str = "Starting a new conversation! Your old chat has been archived.";

pub const STORE_FAILURE_TEXT: &str =
    "Sorry, I couldn't access your conversation history right now. Please try again later.";

/// A text message delivered by the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender_id: i64,
    pub sender_name: String,
    pub chat_id: i64,
    pub text: String,
}

/// Configuration for completion requests.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Model to use for completions
    pub model: String,
    /// Sent ahead of the transcript when set; never stored
    pub system_prompt: Option<String>,
    /// Upper bound on a single completion call
    pub completion_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            system_prompt: None,
            completion_timeout: Duration::from_secs(60),
        }
    }
}

impl SessionConfig {
    /// Set the model name.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Set the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    /// Set the completion timeout.
    #[must_use]
    pub const fn with_completion_timeout(mut self, completion_timeout: Duration) -> Self {
        self.completion_timeout = completion_timeout;
        self
    }
}

/// Handles inbound events for every user.
///
/// Store access for a single user is serialized through [`UserLocks`];
/// events from different users may run concurrently.
pub struct SessionManager {
    provider: Arc<dyn LLMProvider>,
    store: Arc<dyn HistoryStore>,
    transport: Arc<dyn Transport>,
    limiter: Arc<RateLimiter>,
    locks: UserLocks,
    config: SessionConfig,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        store: Arc<dyn HistoryStore>,
        transport: Arc<dyn Transport>,
        limiter: Arc<RateLimiter>,
        config: SessionConfig,
    ) -> Self {
        info!(
            "Creating session manager: model={}, rate limit window={:?}",
            config.model,
            limiter.window()
        );

        Self {
            provider,
            store,
            transport,
            limiter,
            locks: UserLocks::new(),
            config,
        }
    }

    /// Dispatch an inbound event.
    ///
    /// Store failures are logged and answered with [`STORE_FAILURE_TEXT`];
    /// only transport failures are returned.
    pub async fn handle(&self, event: &InboundMessage) -> Result<(), ConversationError> {
        let outcome = match Inbound::classify(&event.text) {
            Inbound::Plain => self.on_plain_message(event).await,
            Inbound::Command(Command::Start) => self.on_start_command(event).await,
            Inbound::Command(Command::Help) => self.on_help_command(event).await,
            Inbound::Command(Command::Reset) => self.on_reset_command(event).await,
            Inbound::UnknownCommand => {
                debug!(
                    "[@{}] Ignoring unknown command: {}",
                    event.sender_name, event.text
                );
                Ok(())
            }
        };

        match outcome {
            Err(ConversationError::Store(e)) => {
                error!("[@{}] History store failure: {e}", event.sender_name);
                self.reply(event, STORE_FAILURE_TEXT).await
            }
            other => other,
        }
    }

    /// Generate a reply to free text and append the exchange to history.
    pub async fn on_plain_message(&self, event: &InboundMessage) -> Result<(), ConversationError> {
        let username = &event.sender_name;

        if event.text.starts_with(COMMAND_MARKER) {
            debug!("[@{username}] Skipping command text in message flow");
            return Ok(());
        }

        if !self
            .limiter
            .try_acquire(event.sender_id, Instant::now())
            .await
        {
            info!("[@{username}] Throttled");
            return self.reply(event, THROTTLED_TEXT).await;
        }

        info!("[@{username}] Message: {}", event.text);

        let guard = self.locks.acquire(event.sender_id).await;
        let record = self
            .store
            .load_or_create(event.sender_id, &event.sender_name)
            .await?;

        let user_turn = ChatMessage::user(event.text.clone());
        let request = self.build_request(&record.messages, &user_turn);

        self.show_typing(event).await;

        let reply = match self.complete(&request).await {
            Ok(content) => content,
            Err(e) => {
                error!("[@{username}] Completion failed: {e}");
                APOLOGY_TEXT.to_string()
            }
        };

        let mut messages = record.messages;
        messages.push(user_turn);
        messages.push(ChatMessage::assistant(reply.clone()));
        self.store
            .replace_messages(event.sender_id, &messages)
            .await?;
        drop(guard);

        info!("[@{username}] Response: {reply}");
        self.reply(event, &reply).await
    }

    /// Archive the current history and start an empty one.
    pub async fn on_reset_command(&self, event: &InboundMessage) -> Result<(), ConversationError> {
        info!("[@{}] Command: /{}", event.sender_name, Command::Reset.name());

        let guard = self.locks.acquire(event.sender_id).await;
        let record = self
            .store
            .load_or_create(event.sender_id, &event.sender_name)
            .await?;

        self.store
            .archive(event.sender_id, &record.display_name, &record.messages)
            .await?;
        self.store.replace_messages(event.sender_id, &[]).await?;
        drop(guard);

        info!(
            "[@{}] Conversation reset, {} messages archived",
            event.sender_name,
            record.messages.len()
        );
        self.reply(event, RESET_TEXT).await
    }

    pub async fn on_start_command(&self, event: &InboundMessage) -> Result<(), ConversationError> {
        info!("[@{}] Command: /{}", event.sender_name, Command::Start.name());
        self.reply(event, Command::welcome_text()).await
    }

    pub async fn on_help_command(&self, event: &InboundMessage) -> Result<(), ConversationError> {
        info!("[@{}] Command: /{}", event.sender_name, Command::Help.name());
        self.reply(event, Command::help_text()).await
    }

    fn build_request(&self, history: &[ChatMessage], user_turn: &ChatMessage) -> Vec<ChatMessage> {
        let mut request = Vec::with_capacity(history.len() + 2);
        if let Some(prompt) = &self.config.system_prompt {
            request.push(ChatMessage::system(prompt.clone()));
        }
        request.extend_from_slice(history);
        request.push(user_turn.clone());
        request
    }

    async fn complete(&self, request: &[ChatMessage]) -> Result<String, CompletionError> {
        let limit = self.config.completion_timeout;
        let response = timeout(limit, self.provider.chat(request, &self.config.model))
            .await
            .map_err(|_| CompletionError::Timeout(limit))?
            .map_err(CompletionError::Provider)?;

        if response.content.trim().is_empty() {
            return Err(CompletionError::EmptyResponse);
        }

        if let Some(usage) = response.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        Ok(response.content)
    }

    async fn show_typing(&self, event: &InboundMessage) {
        if let Err(e) = self.transport.send_typing(event.chat_id).await {
            warn!(
                "[@{}] Failed to send typing indicator: {e}",
                event.sender_name
            );
        }
    }

    async fn reply(&self, event: &InboundMessage, text: &str) -> Result<(), ConversationError> {
        self.transport
            .send_text(event.chat_id, text)
            .await
            .map_err(ConversationError::Transport)
    }
}
