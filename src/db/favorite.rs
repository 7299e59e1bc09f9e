//! Favorite equipment per user.

use crate::entities::{favorites, prelude::*};
use sea_orm::*;

/// Equipment IDs the user marked as favorite.
pub async fn list_for_user(db: &DatabaseConnection, user_id: i32) -> Result<Vec<i32>, DbErr> {
    let rows = Favorites::find()
        .filter(favorites::Column::UserId.eq(user_id))
        .order_by_asc(favorites::Column::Id)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|f| f.equipment_id).collect())
}

/// Mark equipment as favorite. Returns false when it already was.
pub async fn add(db: &DatabaseConnection, user_id: i32, equipment_id: i32) -> Result<bool, DbErr> {
    let exists = Favorites::find()
        .filter(favorites::Column::UserId.eq(user_id))
        .filter(favorites::Column::EquipmentId.eq(equipment_id))
        .count(db)
        .await?
        > 0;
    if exists {
        return Ok(false);
    }

    favorites::ActiveModel {
        user_id: Set(user_id),
        equipment_id: Set(equipment_id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(true)
}

pub async fn remove(db: &DatabaseConnection, user_id: i32, equipment_id: i32) -> Result<bool, DbErr> {
    let result = Favorites::delete_many()
        .filter(favorites::Column::UserId.eq(user_id))
        .filter(favorites::Column::EquipmentId.eq(equipment_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
