use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gram")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Caption, never blank.
    pub message: String,

    /// Content hash of the picture in the picture store.
    pub picture_hash: String,
    /// Original upload filename.
    pub picture_filename: String,
    pub picture_content_type: String,
    pub picture_size: i64,

    /// Owner. Set at creation and never changed.
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
