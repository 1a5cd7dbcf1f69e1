//! Database entities for conversation persistence.

pub mod archived_conversations;
pub mod conversations;
