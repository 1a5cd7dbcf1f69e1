#![warn(
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

//! Per-user conversation sessions.
//!
//! # Key Features
//! - Fixed-window rate limiting of completion requests
//! - Closed set of bot commands parsed from the message prefix
//! - Load, append, archive and reset of each user's transcript
//! - Per-user serialization of store access

mod command;
mod error;
mod locks;
mod rate_limiter;
mod session;

pub use command::{COMMAND_MARKER, Command, Inbound};
pub use error::{CompletionError, ConversationError};
pub use locks::UserLocks;
pub use rate_limiter::{DEFAULT_MAX_TRACKED_USERS, RATE_LIMIT_WINDOW, RateLimiter};
pub use session::{
    APOLOGY_TEXT, InboundMessage, RESET_TEXT, STORE_FAILURE_TEXT, SessionConfig, SessionManager,
    THROTTLED_TEXT,
};
