//! Audit log of user actions.

use chrono::Utc;
use crate::entities::{audit_log, prelude::*};
use sea_orm::*;

/// Append an audit entry.
pub async fn record(
    db: &DatabaseConnection,
    user_id: Option<i32>,
    action: &str,
    entity: &str,
    entity_id: Option<i32>,
    details: Option<String>,
) -> Result<audit_log::Model, DbErr> {
    audit_log::ActiveModel {
        user_id: Set(user_id),
        action: Set(action.to_owned()),
        entity: Set(entity.to_owned()),
        entity_id: Set(entity_id),
        details: Set(details),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Most recent entries first.
pub async fn recent(db: &DatabaseConnection, limit: u64) -> Result<Vec<audit_log::Model>, DbErr> {
    AuditLog::find()
        .order_by_desc(audit_log::Column::Id)
        .limit(limit)
        .all(db)
        .await
}
