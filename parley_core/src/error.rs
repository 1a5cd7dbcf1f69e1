use thiserror::Error;

/// Failures surfaced by a [`crate::HistoryStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),

    #[error("Messages for user {user_id} could not be (de)serialized: {source}")]
    Encoding {
        user_id: i64,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn unavailable(err: impl Into<anyhow::Error>) -> Self {
        Self::Unavailable(err.into())
    }
}
