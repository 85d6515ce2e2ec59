//! Persistence of gram records.
//!
//! Every function is generic over [`ConnectionTrait`] so it runs equally on
//! the pool or inside a transaction. Writes take a [`GramRecord`], which only
//! exists for validated input, so nothing here re-checks field rules.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set, TransactionSession, TransactionTrait,
};

use crate::entity::gram;
use crate::models::gram::GramRecord;

/// Persist a new gram owned by `owner_id`.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    owner_id: i32,
    record: GramRecord,
) -> Result<gram::Model, sea_orm::DbErr> {
    let now = Utc::now();
    let picture = record.picture();
    let new_gram = gram::ActiveModel {
        message: Set(record.message().to_owned()),
        picture_hash: Set(picture.key.to_hex()),
        picture_filename: Set(picture.filename.clone()),
        picture_content_type: Set(picture.content_type.clone()),
        picture_size: Set(picture.size),
        user_id: Set(owner_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    new_gram.insert(db).await
}

/// `None` when no gram has this id.
pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<Option<gram::Model>, sea_orm::DbErr> {
    gram::Entity::find_by_id(id).one(db).await
}

/// All grams, newest first.
pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<gram::Model>, sea_orm::DbErr> {
    gram::Entity::find()
        .order_by_desc(gram::Column::CreatedAt)
        .order_by_desc(gram::Column::Id)
        .all(db)
        .await
}

/// Replace the message and picture of `existing`. The owner is never touched.
///
/// Runs in its own transaction: either every column changes or none does.
pub async fn update<C: ConnectionTrait + TransactionTrait>(
    db: &C,
    existing: gram::Model,
    record: GramRecord,
) -> Result<gram::Model, sea_orm::DbErr> {
    let txn = db.begin().await?;

    let picture = record.picture();
    let mut active: gram::ActiveModel = existing.into();
    active.message = Set(record.message().to_owned());
    active.picture_hash = Set(picture.key.to_hex());
    active.picture_filename = Set(picture.filename.clone());
    active.picture_content_type = Set(picture.content_type.clone());
    active.picture_size = Set(picture.size);
    active.updated_at = Set(Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(model)
}

/// Permanently remove a gram. Returns `false` if it was already gone.
pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<bool, sea_orm::DbErr> {
    let result = gram::Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}
