use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The live transcript of one user. `messages` holds a JSON array of
/// `{role, content}` objects.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "conversations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    pub username: String,
    #[sea_orm(column_type = "Text")]
    pub messages: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
