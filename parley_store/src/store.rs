use async_trait::async_trait;
use chrono::Utc;
use parley_core::{ArchivedConversation, ChatMessage, HistoryStore, StoreError, UserConversation};
use parley_entities::{archived_conversations, conversations};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Schema, Set,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::convert;

/// [`HistoryStore`] persisted through a sea-orm connection.
///
/// Works with any backend sea-orm is built for (PostgreSQL, MySQL, SQLite).
#[derive(Clone)]
pub struct DatabaseHistoryStore {
    db: DatabaseConnection,
}

impl DatabaseHistoryStore {
    /// Connect to the database and create the tables if they are missing.
    ///
    /// # Arguments
    /// * `options` - Connection string or prepared `ConnectOptions`
    pub async fn connect(options: impl Into<ConnectOptions>) -> anyhow::Result<Self> {
        info!("Connecting to database for DatabaseHistoryStore");
        let db = Database::connect(options).await?;
        let store = Self::from_connection(db);
        store.create_tables().await?;
        info!("DatabaseHistoryStore initialized");
        Ok(store)
    }

    /// Wrap an existing connection. Tables are not created.
    #[must_use]
    pub const fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get a reference to the database connection.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Create `conversations` and `archived_conversations` if they do not exist.
    pub async fn create_tables(&self) -> anyhow::Result<()> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);

        let mut conversations_stmt = schema.create_table_from_entity(conversations::Entity);
        let mut archives_stmt = schema.create_table_from_entity(archived_conversations::Entity);

        for stmt in [
            conversations_stmt.if_not_exists(),
            archives_stmt.if_not_exists(),
        ] {
            self.db
                .execute_unprepared(&backend.build(&*stmt).to_string())
                .await?;
        }

        debug!("Conversation tables ready");
        Ok(())
    }

    /// All archives written for a user, oldest first.
    pub async fn archived_conversations(
        &self,
        user_id: i64,
    ) -> Result<Vec<ArchivedConversation>, StoreError> {
        archived_conversations::Entity::find()
            .filter(archived_conversations::Column::UserId.eq(user_id))
            .order_by_asc(archived_conversations::Column::Timestamp)
            .order_by_asc(archived_conversations::Column::Id)
            .all(&self.db)
            .await
            .map_err(StoreError::unavailable)?
            .into_iter()
            .map(convert::archive_from_model)
            .collect()
    }
}

#[async_trait]
impl HistoryStore for DatabaseHistoryStore {
    async fn load_or_create(
        &self,
        user_id: i64,
        display_name: &str,
    ) -> Result<UserConversation, StoreError> {
        let existing = conversations::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(StoreError::unavailable)?;

        if let Some(model) = existing {
            conversations::Entity::update_many()
                .set(conversations::ActiveModel {
                    username: Set(display_name.to_owned()),
                    ..Default::default()
                })
                .filter(conversations::Column::UserId.eq(user_id))
                .exec(&self.db)
                .await
                .map_err(StoreError::unavailable)?;

            let mut conversation = convert::conversation_from_model(model)?;
            conversation.display_name = display_name.to_owned();
            return Ok(conversation);
        }

        conversations::ActiveModel {
            user_id: Set(user_id),
            username: Set(display_name.to_owned()),
            messages: Set(convert::messages_to_json(user_id, &[])?),
        }
        .insert(&self.db)
        .await
        .map_err(StoreError::unavailable)?;

        info!("Created conversation record for user {user_id}");
        Ok(UserConversation::new(user_id, display_name))
    }

    async fn replace_messages(
        &self,
        user_id: i64,
        messages: &[ChatMessage],
    ) -> Result<(), StoreError> {
        let messages_json = convert::messages_to_json(user_id, messages)?;

        conversations::Entity::update_many()
            .set(conversations::ActiveModel {
                messages: Set(messages_json),
                ..Default::default()
            })
            .filter(conversations::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(StoreError::unavailable)?;

        debug!("Stored {} messages for user {user_id}", messages.len());
        Ok(())
    }

    async fn archive(
        &self,
        user_id: i64,
        display_name: &str,
        messages: &[ChatMessage],
    ) -> Result<(), StoreError> {
        if messages.is_empty() {
            debug!("Nothing to archive for user {user_id}");
            return Ok(());
        }

        let id = Uuid::now_v7();
        archived_conversations::ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            username: Set(display_name.to_owned()),
            messages: Set(convert::messages_to_json(user_id, messages)?),
            timestamp: Set(Utc::now().naive_utc()),
        }
        .insert(&self.db)
        .await
        .map_err(StoreError::unavailable)?;

        info!(
            "Archived {} messages for user {user_id} as {id}",
            messages.len()
        );
        Ok(())
    }
}
