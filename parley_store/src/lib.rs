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

//! Durable conversation history backed by sea-orm.
//!
//! Two tables are managed here:
//! - `conversations`: one row per user holding the active transcript
//! - `archived_conversations`: append-only snapshots written on reset

mod convert;
mod store;

pub use parley_core::HistoryStore;
pub use store::DatabaseHistoryStore;
