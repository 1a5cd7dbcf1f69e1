use parley_core::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors that escape a session handler.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("History store error: {0}")]
    Store(#[from] StoreError),

    #[error("Transport error: {0}")]
    Transport(#[source] anyhow::Error),
}

/// Why a completion produced no usable reply. Always recovered locally.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion provider error: {0}")]
    Provider(#[source] anyhow::Error),

    #[error("Completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("Empty response from completion provider")]
    EmptyResponse,
}
