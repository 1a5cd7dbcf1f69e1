use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only snapshot of a transcript superseded by a reset.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "archived_conversations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: i64,
    pub username: String,
    #[sea_orm(column_type = "Text")]
    pub messages: String,
    /// Capture instant, UTC.
    pub timestamp: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
